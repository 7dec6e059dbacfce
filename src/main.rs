use anyhow::Context;
use eframe::egui;

use pak_data_twin::app::PakDataTwinApp;
use pak_data_twin::config::DashboardConfig;
use pak_data_twin::dashboard::Dashboard;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard configuration")?;
    log::info!("Reading indicator data from {}", config.data_dir.display());
    let dashboard = Dashboard::with_config(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pakistan Data Twin",
        options,
        Box::new(|_cc| Ok(Box::new(PakDataTwinApp::new(dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
