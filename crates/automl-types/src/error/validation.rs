//! Client-side dataset validation errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a dataset file is rejected locally, before any upload is attempted.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ValidationError {
    /// File exceeds the upload size limit
    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    TooLarge {
        /// Size of the rejected file in bytes
        size: u64,
        /// Maximum accepted size in bytes
        limit: u64,
    },

    /// File has no content at all
    #[error("File is empty")]
    EmptyFile,

    /// File extension is not one of the accepted formats
    #[error("Unsupported file type '{extension}': expected .csv or .json")]
    UnsupportedExtension {
        /// Extension found on the file (empty when missing)
        extension: String,
    },

    /// No header names could be parsed from the file
    #[error("Could not detect columns in the file")]
    NoColumns,

    /// Headers were found but there are no data rows to preview
    #[error("File has columns but no data rows to preview")]
    EmptyPreview,

    /// JSON dataset is not an array of records
    #[error("Invalid JSON dataset: {message}")]
    InvalidJson {
        /// Parser or shape error detail
        message: String,
    },

    /// File content is not valid UTF-8 text
    #[error("File is not valid UTF-8 text")]
    NotText,
}
