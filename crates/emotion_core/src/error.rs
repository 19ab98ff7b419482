use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Why a prediction call did not produce a usable result. Users only ever
/// see the generic failure text; this is what goes to the log.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("transport failure")]
    Transport(#[from] reqwest::Error),
    #[error("cannot send media type {media_type:?}")]
    MediaType {
        media_type: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("prediction service answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed prediction payload")]
    Decode(#[from] serde_json::Error),
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Diagnostic description of a failed submission, kept for the log and for
/// tests. Never shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub detail: String,
}

impl ErrorInfo {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<&PredictError> for ErrorInfo {
    fn from(err: &PredictError) -> Self {
        let mut detail = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_chain_is_flattened_once() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let cause_text = cause.to_string();
        let info = ErrorInfo::from(&PredictError::Decode(cause));
        assert_eq!(info.detail, format!("malformed prediction payload: {cause_text}"));
        assert_eq!(info.detail.matches(&cause_text).count(), 1);
    }

    #[test]
    fn status_detail_carries_code_and_body() {
        let info = ErrorInfo::from(&PredictError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        });
        assert!(info.detail.contains("502"));
        assert!(info.detail.contains("upstream down"));
    }
}
