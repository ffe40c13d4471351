//! # AutoML Types
//!
//! Backend contract models, persisted UI state, and error definitions for AutoML Studio.
//!
//! This crate provides the foundational type system for the workspace:
//!
//! - **`error`** - Typed errors for client-side validation and durable storage
//! - **`models`** - Request/response bodies of the AutoML REST API and the persisted UI state
//!
//! ## Architecture Role
//!
//! `automl-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!            automl-types (this crate)
//!                    │
//!                    ▼
//!              automl-client
//!                    │
//!                    ▼
//!               automl-cli
//! ```
//!
//! All response types tolerate unknown fields and default missing optional ones,
//! since the backend is an external collaborator whose payloads may grow.

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{StorageError, ValidationError};

// Re-export core model types
pub use models::{
    Account, AlgorithmInfo, AnalysisReport, Dataset, DatasetPreview, DatasetSnapshot,
    PredictRequest, PredictResponse, PredictSchema, ResourceId, TaskType, TokenResponse,
    TrainRequest, TrainResult, TrainingConfig, UiState,
};
