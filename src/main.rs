mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod views;

use std::path::Path;

use anyhow::anyhow;
use app::RustyBestsellersApp;
use config::{DEFAULT_DATA_PATH, MIN_WINDOW_SIZE, WINDOW_SIZE};
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = Path::new(DEFAULT_DATA_PATH);
    let dataset = data::loader::load_file(path)?;
    log::info!("Loaded {} games from {}", dataset.len(), path.display());
    let state = AppState::new(dataset, path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(MIN_WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Bestsellers – Steam Games Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyBestsellersApp::new(state)))),
    )
    .map_err(|e| anyhow!("failed to start the window: {e}"))
}
