//! Domain models for the AutoML backend contract.
//!
//! Request and response bodies mirror the REST endpoints; `ui_state` holds what the
//! front end persists between runs.

mod account;
mod auth;
mod dataset;
mod id;
mod prediction;
mod training;
mod ui_state;

// Re-export all models
pub use account::{Account, AccountUpdate, HistoryEntry};
pub use auth::{SignupRequest, TokenResponse};
pub use dataset::{
    display_value, AnalysisReport, CreateDatasetRequest, Dataset, DatasetPreview, UploadResponse,
};
pub use id::ResourceId;
pub use prediction::{FeatureSpec, PredictRequest, PredictResponse, PredictSchema};
pub use training::{
    AlgorithmInfo, AlgorithmList, AutoMlRequest, AutoMlResponse, LeaderboardEntry, TaskType,
    TrainRequest, TrainResponse, TrainResult,
};
pub use ui_state::{DatasetSnapshot, TrainingConfig, UiState};
