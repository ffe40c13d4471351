//! Error types for the AutoML client.

use automl_types::{StorageError, ValidationError};
use thiserror::Error;

/// Errors that can occur when using the AutoML client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, TLS, timeout).
    #[error("Network error: {message}")]
    Network {
        /// Transport-level description of the failure.
        message: String,
    },

    /// Server rejected the session; it has been logged out.
    #[error("Session expired or invalid, please log in again")]
    Unauthorized,

    /// Server answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the response.
        message: String,
        /// Parsed JSON body, when the response had one.
        body: Option<serde_json::Value>,
    },

    /// Server returned a body that does not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Dataset file rejected before upload.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Durable client state could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// HTTP status of an `Api` error.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Whether a prediction failure says the stored model cannot be loaded.
    ///
    /// Callers use this to send the user back to retraining instead of
    /// showing the raw error.
    pub fn is_corrupted_model(&self) -> bool {
        let Self::Api { message, body, .. } = self else {
            return false;
        };
        let mut haystack = message.to_lowercase();
        if let Some(body) = body {
            haystack.push(' ');
            haystack.push_str(&body.to_string().to_lowercase());
        }
        haystack.contains("corrupt") || haystack.contains("retrain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api(status: u16, message: &str, body: Option<serde_json::Value>) -> ClientError {
        ClientError::Api { status, message: message.to_string(), body }
    }

    #[test]
    fn corrupted_model_detected_in_message_or_body() {
        assert!(api(500, "Model file is corrupted", None).is_corrupted_model());
        assert!(api(400, "Bad input", Some(json!({"detail": "please RETRAIN the model"})))
            .is_corrupted_model());
        assert!(!api(400, "Missing feature 'age'", None).is_corrupted_model());
        assert!(!ClientError::Unauthorized.is_corrupted_model());
    }

    #[test]
    fn api_error_displays_extracted_message() {
        assert_eq!(api(404, "Dataset not found", None).to_string(), "Dataset not found");
        assert_eq!(api(404, "x", None).status(), Some(404));
    }
}
