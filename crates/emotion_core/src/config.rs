//! Client settings, read from TOML.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/predict";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Full URL of the prediction endpoint.
    pub endpoint: String,
    /// Health probe URL. Derived from `endpoint` when unset.
    pub health_endpoint: Option<String>,
    /// No timeout of our own unless set; the transport default applies.
    pub request_timeout_secs: Option<u64>,
    pub check_health_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            health_endpoint: None,
            request_timeout_secs: None,
            check_health_on_start: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads `path`; a missing file is not an error and yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
        self
    }

    pub fn health_url(&self) -> String {
        if let Some(url) = &self.health_endpoint {
            return url.clone();
        }
        let base = self.endpoint.trim_end_matches('/');
        match base.rfind('/') {
            Some(idx) if !base[..idx].ends_with('/') => format!("{}/health", &base[..idx]),
            _ => format!("{base}/health"),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
