//! User-visible side effects of the response policy.

use tracing::{info, warn};

/// Receives the two user-facing signals the pipeline produces.
///
/// A browser front end would show a toast and navigate to the login page; the
/// CLI prints to stderr. Implementations must be cheap and non-blocking.
pub trait SessionEvents: Send + Sync {
    /// A request failed and the user should see `message`.
    fn error_notice(&self, message: &str);

    /// The session was rejected; the user has to log in again.
    fn login_required(&self);
}

/// Default events sink: records both signals in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl SessionEvents for TracingEvents {
    fn error_notice(&self, message: &str) {
        warn!(notice = true, "{}", message);
    }

    fn login_required(&self) {
        info!("Login required");
    }
}
