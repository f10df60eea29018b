use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::{ChartLayout, DOWNLOAD_STEP};
use crate::data::filter::FilteredView;
use crate::state::AppState;

use super::thousands;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            downloads_input(ui, state);
            ui.separator();
            year_slider(ui, state);
            ui.separator();
            developer_select(ui, state);
            os_select(ui, state);
            ui.separator();

            if ui.checkbox(&mut state.filters.free_only, "Free only").changed() {
                state.refilter();
            }
            ui.add_space(8.0);
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

fn downloads_input(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Minimum downloads");
    let max = state.domain.download_bounds.map_or(0.0, |(_, hi)| hi);
    let changed = ui
        .add(
            egui::DragValue::new(&mut state.filters.min_downloads)
                .range(0.0..=max)
                .speed(DOWNLOAD_STEP)
                .custom_formatter(|v, _| thousands(v))
                .custom_parser(|s| s.replace(',', "").trim().parse().ok()),
        )
        .changed();
    ui.horizontal(|ui: &mut Ui| {
        let step_down = ui.small_button("−").clicked();
        let step_up = ui.small_button("+").clicked();
        if step_down || step_up {
            let delta = if step_up { DOWNLOAD_STEP } else { -DOWNLOAD_STEP };
            state.filters.min_downloads = (state.filters.min_downloads + delta).clamp(0.0, max);
        }
        if changed || step_down || step_up {
            state.refilter();
        }
    });
}

fn year_slider(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Release year range");
    let Some((min_year, max_year)) = state.domain.year_bounds else {
        ui.label("No release dates in this dataset.");
        return;
    };
    let (mut lo, mut hi) = state.filters.year_range;
    let from = ui.add(egui::Slider::new(&mut lo, min_year..=max_year).text("from"));
    let to = ui.add(egui::Slider::new(&mut hi, min_year..=max_year).text("to"));
    if from.changed() || to.changed() {
        state.set_year_range(lo, hi);
    }
}

fn developer_select(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.filters.selected_developers.len();
    let n_total = state.domain.developer_options.len();
    let header = format!("Developers  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("developers")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut state.developer_search)
                        .hint_text("Search…")
                        .desired_width(130.0),
                );
                if ui.small_button("Clear").clicked() {
                    state.filters.selected_developers.clear();
                    state.refilter();
                }
            });

            let needle = state.developer_search.to_lowercase();
            let options: Vec<String> = state
                .domain
                .developer_options
                .iter()
                .filter(|d| needle.is_empty() || d.to_lowercase().contains(&needle))
                .cloned()
                .collect();

            ScrollArea::vertical()
                .id_salt("developer_list")
                .max_height(220.0)
                .show(ui, |ui: &mut Ui| {
                    for dev in &options {
                        let mut checked = state.filters.selected_developers.contains(dev);
                        let text = RichText::new(dev).color(state.developer_colors.color_for(dev));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_developer(dev);
                        }
                    }
                });
        });
}

fn os_select(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.filters.selected_os.len();
    let n_total = state.domain.os_options.len();
    let header = format!("Supported OS  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("supported_os")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if state.domain.os_options.is_empty() {
                ui.label("No OS information in this dataset.");
                return;
            }
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut state.os_search)
                        .hint_text("Search…")
                        .desired_width(130.0),
                );
                if ui.small_button("Clear").clicked() {
                    state.filters.selected_os.clear();
                    state.refilter();
                }
            });

            let needle = state.os_search.to_lowercase();
            let options: Vec<String> = state
                .domain
                .os_options
                .iter()
                .filter(|os| needle.is_empty() || os.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            for os in &options {
                let mut checked = state.filters.selected_os.contains(os);
                if ui.checkbox(&mut checked, os.as_str()).changed() {
                    state.toggle_os(os);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} games loaded from {}, {} visible",
            state.dataset.len(),
            state.source.display(),
            state.visible_indices.len()
        ));

        ui.separator();

        for layout in [ChartLayout::Genres, ChartLayout::Developers] {
            if ui
                .selectable_label(state.layout == layout, layout.label())
                .clicked()
            {
                state.layout = layout;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open game data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!("Loaded {} games from {}", dataset.len(), path.display());
                state.set_dataset(dataset, &path);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered games table
// ---------------------------------------------------------------------------

fn cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.decimals$}"))
}

/// Scrollable table of the games passing the filters.
pub fn games_table(ui: &mut Ui, view: &FilteredView) {
    let text_height = egui::TextStyle::Body.resolve(ui.style()).size + 4.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .column(Column::initial(220.0).at_least(80.0).clip(true))
        .column(Column::initial(160.0).at_least(60.0).clip(true))
        .columns(Column::auto(), 5)
        .header(20.0, |mut header| {
            for title in ["Game", "Developer", "Price", "Rating", "Downloads", "Year", "Like rate"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(text_height, view.len(), |mut row| {
                let g = view.records()[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&g.game_name);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&g.developer);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(g.price, 2));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(g.rating, 2));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(g.estimated_downloads.map(thousands).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(g.release_year.map(|y| y.to_string()).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(g.reviews_like_rate, 0));
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cells_for_missing_values() {
        assert_eq!(cell(None, 2), "");
        assert_eq!(cell(Some(4.5), 2), "4.50");
        assert_eq!(cell(Some(87.6), 0), "88");
    }
}
