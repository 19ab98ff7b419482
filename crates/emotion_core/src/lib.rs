//! Headless core of the emotion client: file intake, preview decoding, the
//! single-flight prediction state machine and result presentation.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod intake;
pub mod presenter;
pub mod preview;

pub use client::{HealthStatus, HttpPredictionClient, PredictionClient, PredictionResult};
pub use config::AppConfig;
pub use controller::{
    DragKind, DragSurface, Effect, Event, PredictionController, RequestState, SubmissionId,
    TriggerState, UiState, run_request,
};
pub use error::{ConfigError, ErrorInfo, PredictError};
pub use intake::{FileIntake, FileSource, RawFileHandle, SelectedFile, SelectionId};
pub use presenter::{ResultPresenter, ResultView};
pub use preview::PreviewHandle;
