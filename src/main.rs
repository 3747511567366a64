mod app;
mod charts;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::HouseScopeApp;
use eframe::egui;

/// Dataset loaded at startup; File → Open… can point elsewhere at runtime.
const DATA_PATH: &str = "data/train.csv";

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HouseScope – House Price Analytics",
        options,
        Box::new(|_cc| {
            let mut app = HouseScopeApp::default();
            app.state.load_path(Path::new(DATA_PATH));
            Ok(Box::new(app))
        }),
    )
}
