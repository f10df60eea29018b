use eframe::egui::{vec2, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui};

use super::layout::{to_unit, Orbit};
use super::{empty_chart, thousands};

/// One marker in model coordinates.
#[derive(Debug, Clone)]
pub struct Marker3d {
    pub position: [f64; 3],
    pub radius: f32,
    pub color: Color32,
    pub hover: String,
}

/// Orthographic 3D scatter; drag to orbit.
pub fn scatter3d(ui: &mut Ui, markers: &[Marker3d], axes: [&str; 3], orbit: &mut Orbit, height: f32) {
    if markers.is_empty() {
        empty_chart(ui, height);
        return;
    }

    let (response, painter) =
        ui.allocate_painter(vec2(ui.available_width(), height), Sense::click_and_drag());
    if response.dragged() {
        orbit.drag(response.drag_delta());
    }
    let rect = response.rect;
    let center = rect.center();
    let scale = rect.width().min(rect.height()) * 0.3;

    let mut bounds = [(f64::INFINITY, f64::NEG_INFINITY); 3];
    for m in markers {
        for (b, v) in bounds.iter_mut().zip(m.position) {
            b.0 = b.0.min(v);
            b.1 = b.1.max(v);
        }
    }
    let to_screen = |p: [f32; 3]| -> (Pos2, f32) {
        let (offset, depth) = orbit.project(p);
        (center + offset * scale, depth)
    };

    // Axes from the cube's far corner, labelled with their value range.
    let origin = to_screen([-1.0, -1.0, -1.0]).0;
    let axis_stroke = Stroke::new(1.0, ui.visuals().weak_text_color());
    let text_color = ui.visuals().text_color();
    for (k, name) in axes.iter().enumerate() {
        let mut end = [-1.0f32; 3];
        end[k] = 1.0;
        let tip = to_screen(end).0;
        painter.line_segment([origin, tip], axis_stroke);
        let (lo, hi) = bounds[k];
        painter.text(
            tip,
            Align2::CENTER_BOTTOM,
            format!("{name} ({}–{})", short(lo), short(hi)),
            FontId::proportional(11.0),
            text_color,
        );
    }

    let mut projected: Vec<(usize, Pos2, f32)> = markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let unit = [
                to_unit(m.position[0], bounds[0].0, bounds[0].1),
                to_unit(m.position[1], bounds[1].0, bounds[1].1),
                to_unit(m.position[2], bounds[2].0, bounds[2].1),
            ];
            let (pos, depth) = to_screen(unit);
            (i, pos, depth)
        })
        .collect();
    // Far points first so near ones paint over them.
    projected.sort_by(|a, b| b.2.total_cmp(&a.2));

    for &(i, pos, _) in &projected {
        let m = &markers[i];
        painter.circle(pos, m.radius, m.color.gamma_multiply(0.8), Stroke::new(0.5, Color32::WHITE));
    }

    if let Some(pointer) = response.hover_pos() {
        let nearest = projected
            .iter()
            .rev()
            .find(|(i, pos, _)| pos.distance(pointer) <= markers[*i].radius.max(4.0));
        if let Some(&(i, _, _)) = nearest {
            response.on_hover_text_at_pointer(markers[i].hover.clone());
        }
    }
}

fn short(v: f64) -> String {
    if v.abs() >= 1000.0 {
        thousands(v)
    } else {
        format!("{v:.1}")
    }
}
