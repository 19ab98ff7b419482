//! Outbound calls to the prediction service.

use crate::config::AppConfig;
use crate::error::{ConfigError, PredictError};
use crate::intake::SelectedFile;
use chrono::{DateTime, NaiveDateTime};
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;

/// Multipart field the service reads the image from.
pub const UPLOAD_FIELD: &str = "file";

const MAX_LOGGED_BODY: usize = 512;

/// What the service decided about one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub emotion: String,
    /// In [0,1].
    pub confidence: f64,
    /// Service-side time of the prediction, when it sent a readable one.
    pub analyzed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
struct PredictionPayload {
    emotion: String,
    confidence: f64,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

/// Seam between the controller's host and the network.
pub trait PredictionClient: Send + Sync {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError>;
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: String,
    health_endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: cfg.endpoint.clone(),
            health_endpoint: cfg.health_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn check_health(&self) -> Result<HealthStatus, PredictError> {
        let resp = self.http.get(&self.health_endpoint).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::Status {
                status,
                body: truncated_body(resp.text().unwrap_or_default()),
            });
        }
        let body = resp.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl PredictionClient for HttpPredictionClient {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|source| PredictError::MediaType {
                media_type: file.media_type.clone(),
                source,
            })?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(
            endpoint = %self.endpoint,
            bytes = file.len(),
            media_type = %file.media_type,
            "sending prediction request"
        );
        let resp = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::Status {
                status,
                body: truncated_body(resp.text().unwrap_or_default()),
            });
        }
        let body = resp.bytes()?;
        parse_prediction(&body)
    }
}

/// Turns a 2xx body into a result; anything off-shape is an error.
pub fn parse_prediction(body: &[u8]) -> Result<PredictionResult, PredictError> {
    let payload: PredictionPayload = serde_json::from_slice(body)?;
    if !payload.confidence.is_finite() || !(0.0..=1.0).contains(&payload.confidence) {
        return Err(PredictError::InvalidConfidence(payload.confidence));
    }
    let analyzed_at = payload.timestamp.as_deref().and_then(parse_timestamp);
    Ok(PredictionResult {
        emotion: payload.emotion,
        confidence: payload.confidence,
        analyzed_at,
    })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.naive_local()),
        Err(e) => {
            tracing::debug!("ignoring unreadable timestamp {raw:?}: {e}");
            None
        }
    }
}

fn truncated_body(body: String) -> String {
    if body.len() <= MAX_LOGGED_BODY {
        return body;
    }
    body.chars().take(MAX_LOGGED_BODY).collect()
}
