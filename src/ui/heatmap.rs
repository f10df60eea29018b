use eframe::egui::{pos2, vec2, Align2, Color32, FontId, Rect, Sense, Ui};

use crate::color::{ContinuousColors, ContinuousScale};
use crate::views::stats::CorrelationMatrix;

use super::{empty_chart, text_color_for};

const LABEL_WIDTH: f32 = 90.0;
const LABEL_HEIGHT: f32 = 22.0;

/// Annotated correlation matrix.
pub fn correlation_heatmap(ui: &mut Ui, matrix: Option<&CorrelationMatrix>, height: f32) {
    let Some(matrix) = matrix else {
        empty_chart(ui, height);
        return;
    };

    let (response, painter) =
        ui.allocate_painter(vec2(ui.available_width().min(height * 1.6), height), Sense::hover());
    let rect = response.rect;
    let n = matrix.labels.len();
    let grid = Rect::from_min_max(
        pos2(rect.min.x + LABEL_WIDTH, rect.min.y),
        pos2(rect.max.x, rect.max.y - LABEL_HEIGHT),
    );
    let cell = vec2(grid.width() / n as f32, grid.height() / n as f32);
    let colors = ContinuousColors::new(ContinuousScale::Viridis, value_range(matrix));
    let font = FontId::proportional(11.0);

    for (i, row) in matrix.cells.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let r = Rect::from_min_size(
                grid.min + vec2(cell.x * j as f32, cell.y * i as f32),
                cell,
            );
            let fill = match value {
                Some(v) => colors.color_for(Some(*v)),
                None => Color32::from_gray(230),
            };
            painter.rect_filled(r.shrink(0.5), 0.0, fill);
            if let Some(v) = value {
                painter.text(
                    r.center(),
                    Align2::CENTER_CENTER,
                    format!("{v:.4}"),
                    font.clone(),
                    text_color_for(fill),
                );
            }
        }
    }

    let text_color = ui.visuals().text_color();
    for (k, label) in matrix.labels.iter().enumerate() {
        let y = grid.min.y + cell.y * (k as f32 + 0.5);
        painter.text(
            pos2(grid.min.x - 6.0, y),
            Align2::RIGHT_CENTER,
            label,
            font.clone(),
            text_color,
        );
        let x = grid.min.x + cell.x * (k as f32 + 0.5);
        painter.text(
            pos2(x, grid.max.y + 4.0),
            Align2::CENTER_TOP,
            label,
            font.clone(),
            text_color,
        );
    }

    if let Some(pointer) = response.hover_pos() {
        if grid.contains(pointer) {
            let j = (((pointer.x - grid.min.x) / cell.x) as usize).min(n - 1);
            let i = (((pointer.y - grid.min.y) / cell.y) as usize).min(n - 1);
            let value = matrix.cells[i][j]
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| "undefined".to_string());
            response.on_hover_text_at_pointer(format!(
                "{} × {}: {value}\n({} complete games)",
                matrix.labels[i], matrix.labels[j], matrix.rows
            ));
        }
    }
}

/// Colour range spanned by the defined cells.
fn value_range(matrix: &CorrelationMatrix) -> Option<(f64, f64)> {
    matrix
        .cells
        .iter()
        .flatten()
        .flatten()
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}
