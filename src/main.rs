mod action;
mod app;
mod color;
mod data;
mod settings;
mod state;
mod ui;

use std::path::Path;

use app::RustySweepApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional capture file to open at startup.
    let mut state = AppState::default();
    if let Some(path) = std::env::args_os().nth(1) {
        ui::panels::load_captures(&mut state, Path::new(&path));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Sweep – Spectrum Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RustySweepApp::new(state)))),
    )
}
