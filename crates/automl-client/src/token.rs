//! Bearer token structure checks and display-only claim decoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Whether `token` has the three dot-separated segments of a JWT.
///
/// This is the only check applied to a persisted token; its contents are
/// never used to expire the session locally.
pub fn is_well_formed(token: &str) -> bool {
    !token.trim().is_empty() && token.split('.').count() == 3
}

/// Claims read from the token payload for display (`automl status`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject, normally the username
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as a unix timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decodes the payload segment. Returns `None` for opaque tokens.
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}
