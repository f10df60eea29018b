pub mod charts;
pub mod heatmap;
pub mod hierarchy;
pub mod layout;
pub mod panels;
pub mod scatter3d;

use eframe::egui::{self, Color32, RichText, Ui};

/// Section heading above each chart.
pub fn chart_heading(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.separator();
}

/// Placeholder drawn instead of a chart that has nothing to show.
pub fn empty_chart(ui: &mut Ui, height: f32) {
    let size = egui::vec2(ui.available_width(), height.min(80.0));
    ui.allocate_ui(size, |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new("No games match the current filters.").italics());
        });
    });
}

/// `1234567.0` → `"1,234,567"`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Shorten a label to `max` characters, adding an ellipsis.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_for(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(1234567.0), "1,234,567");
        assert_eq!(thousands(-25000.0), "-25,000");
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate_label("Portal", 10), "Portal");
        assert_eq!(truncate_label("Counter-Strike 2", 8), "Counter…");
    }

    #[test]
    fn picks_readable_text() {
        assert_eq!(text_color_for(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_color_for(Color32::from_rgb(68, 1, 84)), Color32::WHITE);
    }
}
