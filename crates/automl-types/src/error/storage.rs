//! Durable client state errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing durable client state.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum StorageError {
    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {message}")]
    DataDir {
        /// Description of the failure
        message: String,
    },

    /// Read failed (permission denied, etc)
    #[error("Failed to read {path}: {message}")]
    Read {
        /// File that could not be read
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Write failed (permission denied, disk full, etc)
    #[error("Failed to write {path}: {message}")]
    Write {
        /// File that could not be written
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Stored content could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File with invalid content
        path: String,
        /// Description of the parse failure
        message: String,
    },
}

impl StorageError {
    /// Create a read error from an IO error.
    pub fn read(path: &std::path::Path, e: &std::io::Error) -> Self {
        Self::Read { path: path.display().to_string(), message: e.to_string() }
    }

    /// Create a write error from an IO error.
    pub fn write(path: &std::path::Path, e: &std::io::Error) -> Self {
        Self::Write { path: path.display().to_string(), message: e.to_string() }
    }

    /// Create a parse error from a serde_json error.
    pub fn parse(path: &std::path::Path, e: &serde_json::Error) -> Self {
        Self::Parse { path: path.display().to_string(), message: e.to_string() }
    }
}
