//! Client configuration resolved from the environment.

use automl_types::StorageError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Backend used when no valid override is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "AUTOML_API_URL";

/// Environment variable overriding the durable state directory.
pub const DATA_DIR_ENV: &str = "AUTOML_DATA_DIR";

const DATA_DIR: &str = ".automl-studio";

/// Configuration for the AutoML client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: Url,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout: None }
    }
}

impl ClientConfig {
    /// Reads `AUTOML_API_URL`, falling back to the default backend.
    pub fn from_env() -> Self {
        let raw = std::env::var(API_URL_ENV).ok();
        Self::with_base_url(raw.as_deref())
    }

    /// Builds a config from an optional base URL override. Never fails.
    pub fn with_base_url(raw: Option<&str>) -> Self {
        Self { base_url: resolve_base_url(raw), ..Self::default() }
    }
}

/// Validates a base URL override.
///
/// A missing override, or anything that does not parse as an absolute
/// `http`/`https` URL with a host, is replaced by [`DEFAULT_BASE_URL`] and a
/// warning is logged.
pub fn resolve_base_url(raw: Option<&str>) -> Url {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        warn!("No {} configured, using {}", API_URL_ENV, DEFAULT_BASE_URL);
        return default_base_url();
    };

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => url,
        Ok(url) => {
            warn!(
                "Ignoring {}={:?}: scheme '{}' is not http(s), using {}",
                API_URL_ENV,
                raw,
                url.scheme(),
                DEFAULT_BASE_URL
            );
            default_base_url()
        },
        Err(e) => {
            warn!("Ignoring {}={:?}: {}, using {}", API_URL_ENV, raw, e, DEFAULT_BASE_URL);
            default_base_url()
        },
    }
}

#[allow(clippy::expect_used, reason = "DEFAULT_BASE_URL is a valid constant")]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL parses")
}

/// Get the durable state directory, creating it if needed.
///
/// `AUTOML_DATA_DIR` takes precedence over `~/.automl-studio`.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let data_dir = if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir().ok_or_else(|| StorageError::DataDir {
            message: "Cannot get home directory".to_string(),
        })?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| StorageError::DataDir {
            message: format!("Failed to create {}: {}", data_dir.display(), e),
        })?;
    }

    Ok(data_dir)
}
