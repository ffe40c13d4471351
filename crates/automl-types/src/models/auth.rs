//! Authentication payloads.

use serde::{Deserialize, Serialize};

/// Response body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// Bearer credential for subsequent requests
    pub access_token: String,
    /// Token scheme, normally "bearer"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Request body of `POST /signup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}
