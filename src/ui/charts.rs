use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, PlotUi,
    Points, Text, VLine,
};

use crate::color::{CategoryColors, ContinuousColors, ContinuousScale};
use crate::data::model::GameRecord;
use crate::views::ranking::{Bubble, ParallelRow, PARALLEL_AXES};
use crate::views::stats::YearTotal;

use super::{empty_chart, thousands, truncate_label};

const PLOT_HEIGHT: f32 = 380.0;

// ---------------------------------------------------------------------------
// Top downloads (bar)
// ---------------------------------------------------------------------------

/// One bar per game, tallest first.
pub fn top_downloads_bar(ui: &mut Ui, games: &[&GameRecord]) {
    if games.is_empty() {
        empty_chart(ui, PLOT_HEIGHT);
        return;
    }

    let bars: Vec<Bar> = games
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.estimated_downloads.unwrap_or(0.0))
                .name(&g.game_name)
                .width(0.7)
        })
        .collect();
    let names: Vec<String> = games.iter().map(|g| truncate_label(&g.game_name, 14)).collect();

    let chart = BarChart::new(bars)
        .color(Color32::from_rgb(99, 110, 250))
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!(
                "Game Name: {}\nEstimated Downloads: {}",
                bar.name,
                thousands(bar.value)
            )
        }));

    Plot::new("top_downloads")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .x_axis_label("Game")
        .y_axis_label("Downloads")
        .x_axis_formatter(move |mark: GridMark, _range| index_label(&names, mark.value))
        .y_axis_formatter(|mark: GridMark, _range| thousands(mark.value))
        .show_x(false)
        .show_y(false)
        .include_y(0.0)
        .show(ui, |plot_ui: &mut PlotUi| {
            plot_ui.bar_chart(chart);
        });
}

/// Label for integer grid marks, empty between them.
fn index_label(labels: &[String], value: f64) -> String {
    if value.fract().abs() > f64::EPSILON || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Parallel coordinates
// ---------------------------------------------------------------------------

/// Each row is a polyline across five axes, each axis min-max scaled to
/// `[0, 1]`; lines are coloured by downloads.
pub fn parallel_coordinates(ui: &mut Ui, rows: &[ParallelRow]) {
    if rows.is_empty() {
        empty_chart(ui, PLOT_HEIGHT);
        return;
    }

    let mut bounds = [(f64::INFINITY, f64::NEG_INFINITY); 5];
    for row in rows {
        for (b, v) in bounds.iter_mut().zip(row.axes()) {
            b.0 = b.0.min(v);
            b.1 = b.1.max(v);
        }
    }
    let scale = |axis: usize, v: f64| {
        let (lo, hi) = bounds[axis];
        if hi - lo > f64::EPSILON {
            (v - lo) / (hi - lo)
        } else {
            0.5
        }
    };
    let colors = ContinuousColors::new(ContinuousScale::Plasma, Some(bounds[0]));

    Plot::new("parallel_coordinates")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .show_y(false)
        .show_x(false)
        .show_grid(false)
        .include_y(-0.12)
        .include_y(1.08)
        .x_axis_formatter(|mark: GridMark, _range| {
            let labels = PARALLEL_AXES.map(String::from);
            index_label(&labels, mark.value)
        })
        .y_axis_formatter(|_mark: GridMark, _range| String::new())
        .show(ui, |plot_ui: &mut PlotUi| {
            for row in rows {
                let points: PlotPoints = row
                    .axes()
                    .iter()
                    .enumerate()
                    .map(|(axis, &v)| [axis as f64, scale(axis, v)])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .color(colors.color_for(Some(row.downloads)).gamma_multiply(0.7))
                        .width(1.0),
                );
            }
            for (axis, (lo, hi)) in bounds.iter().enumerate() {
                plot_ui.vline(VLine::new(axis as f64).color(Color32::GRAY).width(1.5));
                plot_ui.text(Text::new(PlotPoint::new(axis as f64, 1.05), axis_value(*hi)));
                plot_ui.text(Text::new(PlotPoint::new(axis as f64, -0.05), axis_value(*lo)));
            }
        });
}

fn axis_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        thousands(v)
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Price vs rating bubbles
// ---------------------------------------------------------------------------

/// Bubble area follows downloads; colour follows developer.
pub fn price_rating_bubbles(ui: &mut Ui, bubbles: &[Bubble], colors: &CategoryColors) {
    if bubbles.is_empty() {
        empty_chart(ui, PLOT_HEIGHT);
        return;
    }

    let max_downloads = bubbles.iter().map(|b| b.downloads).fold(0.0, f64::max);
    let radius = |d: f64| {
        if max_downloads > 0.0 {
            3.0 + 22.0 * (d / max_downloads).sqrt() as f32
        } else {
            3.0
        }
    };

    let response = Plot::new("price_rating")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Price")
        .y_axis_label("Rating")
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            for b in bubbles {
                plot_ui.points(
                    Points::new(vec![[b.price, b.rating]])
                        .name(&b.developer)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius(b.downloads))
                        .color(colors.color_for(&b.developer).gamma_multiply(0.75)),
                );
            }
            let centers: Vec<(PlotPoint, f32)> = bubbles
                .iter()
                .map(|b| (PlotPoint::new(b.price, b.rating), radius(b.downloads)))
                .collect();
            hovered_marker(plot_ui, &centers)
        });

    if let Some(i) = response.inner {
        let b = &bubbles[i];
        response.response.on_hover_text_at_pointer(format!(
            "Game Name: {}\nPrice: {:.2}\nRating: {:.2}\nDownloads: {}",
            b.game_name,
            b.price,
            b.rating,
            thousands(b.downloads)
        ));
    }
}

/// Index of the marker under the pointer, smallest first when they overlap.
fn hovered_marker(plot_ui: &PlotUi, markers: &[(PlotPoint, f32)]) -> Option<usize> {
    let pointer = plot_ui.response().hover_pos()?;
    markers
        .iter()
        .enumerate()
        .filter_map(|(i, (center, radius))| {
            let dist = plot_ui.screen_from_plot(*center).distance(pointer);
            (dist <= radius.max(4.0)).then_some((i, *radius))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Downloads per year
// ---------------------------------------------------------------------------

pub fn yearly_downloads(ui: &mut Ui, totals: &[YearTotal]) {
    if totals.is_empty() {
        empty_chart(ui, PLOT_HEIGHT);
        return;
    }

    let points: Vec<[f64; 2]> = totals
        .iter()
        .map(|t| [t.year as f64, t.downloads])
        .collect();
    let color = Color32::from_rgb(99, 110, 250);

    Plot::new("yearly_downloads")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("Year")
        .y_axis_label("Downloads")
        .include_y(0.0)
        .y_axis_formatter(|mark: GridMark, _range| thousands(mark.value))
        .label_formatter(|_name, value| {
            format!("Year: {:.0}\nDownloads: {}", value.x, thousands(value.y))
        })
        .show(ui, |plot_ui: &mut PlotUi| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).color(color).width(2.0));
            plot_ui.points(Points::new(points).radius(4.0).color(color));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_labels_only_on_whole_numbers() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(index_label(&labels, 1.0), "b");
        assert_eq!(index_label(&labels, 0.5), "");
        assert_eq!(index_label(&labels, -1.0), "");
        assert_eq!(index_label(&labels, 7.0), "");
    }

    #[test]
    fn axis_values_switch_to_separators() {
        assert_eq!(axis_value(4.5), "4.50");
        assert_eq!(axis_value(1500000.0), "1,500,000");
    }
}
