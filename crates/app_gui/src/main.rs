mod app;

use app::UiApp;
use eframe::{NativeOptions, egui};
use emotion_core::{ErrorInfo, HttpPredictionClient, PredictionClient};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    if let Err(e) = run() {
        tracing::error!("application stopped: {e:#}");
        eprintln!("Application stopped with error: {e:#}");
    }
}

fn run() -> anyhow::Result<()> {
    let cfg = app::settings::load_config();
    tracing::info!(
        version = env!("EMOTION_LENS_VERSION"),
        endpoint = %cfg.endpoint,
        "starting"
    );

    let http = Arc::new(HttpPredictionClient::new(&cfg)?);
    if cfg.check_health_on_start {
        let probe = Arc::clone(&http);
        thread::spawn(move || match probe.check_health() {
            Ok(health) => tracing::info!(
                status = %health.status,
                model_loaded = health.model_loaded,
                "prediction service reachable"
            ),
            Err(e) => tracing::warn!(
                "prediction service health check failed: {}",
                ErrorInfo::from(&e).detail
            ),
        });
    }
    let client: Arc<dyn PredictionClient> = http;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 680.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Emotion Lens",
        options,
        Box::new(move |_cc| {
            let app: Box<dyn eframe::App> = Box::new(UiApp::new(client, cfg));
            Ok(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
