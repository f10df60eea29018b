use eframe::egui::{self, ScrollArea, Ui};

use crate::color::{CategoryColors, ContinuousColors, ContinuousScale};
use crate::config::{
    ChartLayout, IcicleLimits, BUBBLE_GAMES, DEVELOPER_ICICLE_GAMES, PARALLEL_ROWS,
    SCATTER_3D_POINTS, TAG_SUNBURST_GAMES, TOP_BAR_GAMES, YEAR_SUNBURST_GAMES,
};
use crate::data::filter::FilteredView;
use crate::data::model::Dataset;
use crate::state::AppState;
use crate::ui::hierarchy::Legend;
use crate::ui::scatter3d::Marker3d;
use crate::ui::{charts, chart_heading, heatmap, hierarchy, panels, scatter3d, thousands};
use crate::views::{hierarchy as hviews, ranking, stats};

const HIERARCHY_HEIGHT: f32 = 520.0;
const HEATMAP_HEIGHT: f32 = 360.0;
const SCATTER_HEIGHT: f32 = 520.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyBestsellersApp {
    pub state: AppState,
}

impl RustyBestsellersApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyBestsellersApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

/// Every chart, top to bottom, for the current layout.
fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        dataset,
        visible_indices,
        icicle,
        layout,
        developer_colors,
        profile_orbit,
        reviews_orbit,
        ..
    } = state;
    let dataset: &Dataset = dataset;
    let view = FilteredView::from_indices(dataset, visible_indices);

    chart_heading(ui, &format!("Top {TOP_BAR_GAMES} games by estimated downloads"));
    charts::top_downloads_bar(ui, &ranking::top_downloads(&view, TOP_BAR_GAMES));

    chart_heading(ui, "Downloads by developer and price model");
    let treemap = hviews::developer_treemap(&view);
    hierarchy::treemap(
        ui,
        &treemap,
        &ContinuousColors::new(ContinuousScale::Viridis, treemap.color_range()),
        &Legend {
            value_name: "Downloads",
            color_name: "Like rate",
        },
        HIERARCHY_HEIGHT,
    );

    chart_heading(ui, "Downloads, rating, price, length and difficulty");
    charts::parallel_coordinates(ui, &ranking::parallel_coordinates(&view, PARALLEL_ROWS));

    chart_heading(ui, "Price vs rating");
    charts::price_rating_bubbles(
        ui,
        &ranking::price_rating_bubbles(&view, BUBBLE_GAMES),
        developer_colors,
    );

    match layout {
        ChartLayout::Genres => {
            chart_heading(ui, "Downloads by tag and developer");
            let sunburst = hviews::tag_sunburst(&view, TAG_SUNBURST_GAMES);
            hierarchy::sunburst(
                ui,
                &sunburst,
                &ContinuousColors::new(ContinuousScale::RdBu, sunburst.color_range()),
                &Legend {
                    value_name: "Downloads share",
                    color_name: "Rating",
                },
                HIERARCHY_HEIGHT,
            );
        }
        ChartLayout::Developers => {
            chart_heading(ui, "Downloads by release year and developer");
            let sunburst = hviews::year_sunburst(&view, YEAR_SUNBURST_GAMES);
            hierarchy::sunburst(
                ui,
                &sunburst,
                &ContinuousColors::new(ContinuousScale::Plasma, sunburst.color_range()),
                &Legend {
                    value_name: "Downloads",
                    color_name: "Rating",
                },
                HIERARCHY_HEIGHT,
            );
        }
    }

    chart_heading(ui, "Correlation between game metrics");
    heatmap::correlation_heatmap(ui, stats::correlation_matrix(&view).as_ref(), HEATMAP_HEIGHT);

    chart_heading(ui, "Total downloads per release year");
    charts::yearly_downloads(ui, &stats::yearly_downloads(&view));

    match layout {
        ChartLayout::Genres => {
            chart_heading(ui, "Downloads by age rating and genre");
            icicle_sliders(ui, icicle);
            let tree = hviews::genre_icicle(&view, icicle.max_tags, icicle.max_games);
            hierarchy::icicle(
                ui,
                &tree,
                &ContinuousColors::new(ContinuousScale::Viridis, tree.color_range()),
                &Legend {
                    value_name: "Downloads",
                    color_name: "Rating",
                },
                HIERARCHY_HEIGHT,
            );
        }
        ChartLayout::Developers => {
            chart_heading(ui, &format!("Top {DEVELOPER_ICICLE_GAMES} games by developer"));
            let tree = hviews::developer_icicle(&view, DEVELOPER_ICICLE_GAMES);
            hierarchy::icicle(
                ui,
                &tree,
                &ContinuousColors::new(ContinuousScale::Viridis, tree.color_range()),
                &Legend {
                    value_name: "Downloads",
                    color_name: "Rating",
                },
                HIERARCHY_HEIGHT,
            );
        }
    }

    match layout {
        ChartLayout::Genres => {
            chart_heading(ui, "Design profile of the best rated games (all games)");
            let markers = profile_markers(dataset, developer_colors);
            scatter3d::scatter3d(
                ui,
                &markers,
                ["Difficulty", "Length", "Rating"],
                profile_orbit,
                SCATTER_HEIGHT,
            );
        }
        ChartLayout::Developers => {
            chart_heading(ui, "Price, rating and length (all games)");
            let markers = review_markers(dataset, developer_colors);
            scatter3d::scatter3d(
                ui,
                &markers,
                ["Price", "Rating", "Length"],
                reviews_orbit,
                SCATTER_HEIGHT,
            );
        }
    }
    ui.label("Drag to rotate. This chart ignores the sidebar filters.");

    ui.add_space(12.0);
    egui::CollapsingHeader::new(format!("Filtered games ({})", view.len()))
        .id_salt("games_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| panels::games_table(ui, &view));
}

fn icicle_sliders(ui: &mut Ui, limits: &mut IcicleLimits) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::Slider::new(&mut limits.max_tags, IcicleLimits::TAG_RANGE).text("genres"));
        ui.add(
            egui::Slider::new(&mut limits.max_games, IcicleLimits::GAME_RANGE)
                .text("games per genre"),
        );
    });
}

fn profile_markers(dataset: &Dataset, colors: &CategoryColors) -> Vec<Marker3d> {
    ranking::design_profile(dataset, SCATTER_3D_POINTS)
        .into_iter()
        .map(|p| Marker3d {
            position: [p.difficulty, p.length, p.rating],
            radius: 5.0,
            color: colors.color_for(&p.developer),
            hover: format!(
                "{}\nDeveloper: {}\nDifficulty: {:.1}\nLength: {:.1}\nRating: {:.2}",
                p.game_name, p.developer, p.difficulty, p.length, p.rating
            ),
        })
        .collect()
}

fn review_markers(dataset: &Dataset, colors: &CategoryColors) -> Vec<Marker3d> {
    let points = ranking::price_rating_length(dataset, SCATTER_3D_POINTS);
    let max_reviews = points
        .iter()
        .map(|p| p.all_reviews_number)
        .fold(0.0, f64::max);
    points
        .into_iter()
        .map(|p| {
            let share = if max_reviews > 0.0 {
                (p.all_reviews_number / max_reviews).sqrt()
            } else {
                0.0
            };
            Marker3d {
                position: [p.price, p.rating, p.length],
                radius: 3.0 + 15.0 * share as f32,
                color: colors.color_for(&p.developer),
                hover: format!(
                    "{}\nDeveloper: {}\nPrice: {:.2}\nRating: {:.2}\nLength: {:.1}\nReviews: {}\nDownloads: {}",
                    p.game_name,
                    p.developer,
                    p.price,
                    p.rating,
                    p.length,
                    thousands(p.all_reviews_number),
                    thousands(p.downloads)
                ),
            }
        })
        .collect()
}
