//! Typed error definitions for AutoML Studio.
//!
//! Errors here never involve the network:
//!
//! - **`ValidationError`** - a dataset file was rejected before upload
//! - **`StorageError`** - durable client state could not be read or written
//!
//! Network and protocol failures live in `automl-client`, which wraps both of these.

mod storage;
mod validation;

pub use storage::StorageError;
pub use validation::ValidationError;
