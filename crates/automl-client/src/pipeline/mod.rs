//! Request pipeline shared by every backend call.
//!
//! A [`Dispatcher`] is built for one session generation and captures that
//! generation's token. Each request goes through:
//!
//! 1. request stage: mark in flight, attach `Authorization: Bearer <token>`
//! 2. [`Transport::execute`]
//! 3. response stage: release the in-flight mark, then on failure
//!    - network error: log detail, notice, return
//!    - 502/503/504 with budget left: re-issue the same request once
//!    - 401: log the session out, signal `login_required`, return
//!    - anything else: extract a message, notice (unless suppressed), return
//!
//! Requests marked `bare` only get steps 1 (without auth) and 2.

mod events;
mod message;
mod request;
pub mod retry;
mod transport;

#[cfg(test)]
mod tests;

pub use events::{SessionEvents, TracingEvents};
pub use message::{extract_error_message, FALLBACK_MESSAGE};
pub use request::{ApiRequest, FilePart, RawResponse, RequestBody, RequestMeta};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportErrorKind};

use crate::error::ClientError;
use crate::session::Session;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Dispatch surface bound to a base URL and one session generation.
pub struct Dispatcher {
    base_url: Url,
    token: Option<String>,
    generation: u64,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    events: Arc<dyn SessionEvents>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Builds a dispatcher for the session's current token.
    pub fn new(
        base_url: Url,
        transport: Arc<dyn Transport>,
        session: Arc<Session>,
        events: Arc<dyn SessionEvents>,
    ) -> Self {
        let (token, generation) = session.snapshot();
        Self { base_url, token, generation, transport, session, events }
    }

    /// Session generation this dispatcher was built for.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Absolute URL for an endpoint path such as `/datasets/3/preview`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends `request` under the session policy and returns a success response.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        let trace_id = new_trace_id();
        let url = self.url_for(&request.path);
        let mut request = request;

        loop {
            let prepared = self.prepare(&request);
            let outcome = {
                let _in_flight = self.session.begin_request();
                debug!(
                    "[{}] {} {} (retry {})",
                    trace_id, prepared.method, url, prepared.meta.retry_count
                );
                self.transport.execute(&url, &prepared).await
            };

            let response = match outcome {
                Ok(response) => response,
                Err(e) => return Err(self.on_network_error(&trace_id, &request, &url, e)),
            };

            if response.is_success() {
                return Ok(response);
            }

            if retry::should_retry(response.status, &request.meta) {
                request.meta.retry_count += 1;
                info!(
                    "[{}] Transient status {} from {} {}, retrying (attempt {}/{})",
                    trace_id,
                    response.status.as_u16(),
                    request.method,
                    url,
                    request.meta.retry_count,
                    retry::MAX_AUTO_RETRIES
                );
                continue;
            }

            return Err(self.on_error_status(&trace_id, &request, &url, &response));
        }
    }

    /// Request stage: a copy of `request` with the bearer header attached.
    fn prepare(&self, request: &ApiRequest) -> ApiRequest {
        let mut prepared = request.clone();
        if prepared.meta.bare {
            return prepared;
        }
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    prepared.headers.insert(AUTHORIZATION, value);
                },
                Err(_) => warn!("Session token contains invalid header characters, sending without it"),
            }
        }
        prepared
    }

    fn on_network_error(
        &self,
        trace_id: &str,
        request: &ApiRequest,
        url: &str,
        error: TransportError,
    ) -> ClientError {
        warn!(
            "[{}] Network error on {} {}: kind={:?}, detail={}",
            trace_id, request.method, url, error.kind, error.message
        );
        let message = match error.kind {
            TransportErrorKind::Connect => {
                format!("Cannot reach the server at {}: {}", self.base_url, error.message)
            },
            TransportErrorKind::Timeout => format!("Request timed out: {}", error.message),
            TransportErrorKind::Request | TransportErrorKind::Body => error.message,
        };
        if !request.meta.bare {
            self.events.error_notice(&message);
        }
        ClientError::Network { message }
    }

    fn on_error_status(
        &self,
        trace_id: &str,
        request: &ApiRequest,
        url: &str,
        response: &RawResponse,
    ) -> ClientError {
        let status = response.status;

        if status == StatusCode::UNAUTHORIZED && !request.meta.bare {
            warn!("[{}] {} {} rejected with 401", trace_id, request.method, url);
            if self.session.invalidate() {
                self.events.login_required();
            }
            return ClientError::Unauthorized;
        }

        let message = extract_error_message(response);
        warn!(
            "[{}] {} {} failed with {}: {}",
            trace_id,
            request.method,
            url,
            status.as_u16(),
            message
        );

        if request.meta.bare {
            debug!("[{}] Bare request, no notice", trace_id);
        } else if request.meta.suppress_notice_for == Some(status) {
            debug!("[{}] Notice for {} suppressed by caller", trace_id, status.as_u16());
        } else {
            self.events.error_notice(&message);
        }

        ClientError::Api { status: status.as_u16(), message, body: response.json_value() }
    }
}

fn new_trace_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
