mod app;
mod capture;
mod color;
mod config;
mod data;
mod error;
mod map;
mod state;
mod ui;

use app::LiveMapApp;
use config::Config;
use eframe::egui;
use map::auth::OAuthClient;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}; falling back to default configuration");
            Config::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Live Map Viewer",
        options,
        Box::new(|cc| {
            // Install image loaders so custom icons can be previewed.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let tokens = Box::new(OAuthClient::new(&config.imagery));
            Ok(Box::new(LiveMapApp::new(AppState::new(config, tokens))))
        }),
    )
}
