//! Config discovery and the footer showing where predictions go.

use super::UiApp;
use directories_next::ProjectDirs;
use eframe::egui;
use emotion_core::AppConfig;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "emotion_lens.toml";
pub const ENDPOINT_ENV: &str = "EMOTION_LENS_ENDPOINT";

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("app", "EmotionLens", "EmotionLens")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Settings file (if any) plus the environment override. Never fails: a bad
/// file is logged and defaults are used.
pub fn load_config() -> AppConfig {
    let from_file = config_path()
        .map(|path| load_from(&path))
        .unwrap_or_default();
    from_file.with_endpoint_override(env::var(ENDPOINT_ENV).ok())
}

fn load_from(path: &Path) -> AppConfig {
    match AppConfig::load(path) {
        Ok(cfg) => {
            tracing::debug!("config loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            AppConfig::default()
        }
    }
}

impl UiApp {
    pub(super) fn render_footer(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.small(format!("Endpoint: {}", self.config.endpoint));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(format!("v{}", env!("EMOTION_LENS_VERSION")));
            });
        });
    }
}
