mod app;
mod color;
mod config;
mod data;
mod page;
mod state;
mod ui;

use app::SalesExplorerApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env();
    log::info!(
        "Starting with data file {} (top {}, clip at quantile {})",
        config.data_path.display(),
        config.top_n,
        config.clip_quantile
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Video Game Sales Explorer",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the landing png.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(SalesExplorerApp::new(config)))
        }),
    )
}
