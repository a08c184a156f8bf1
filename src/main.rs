mod config;
mod engine;
mod error;
mod model;
mod store;
mod ui;

use config::AssistantConfig;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AssistantConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Assistant Dofus Rétro - Local")
            .with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Assistant Dofus Rétro - Local",
        options,
        Box::new(|_cc| {
            Ok(Box::new(ui::app::CompanionApp::new(config)))
        }),
    )
}
