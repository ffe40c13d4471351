//! Automatic retry policy for transient gateway errors.

use super::request::RequestMeta;
use reqwest::StatusCode;

/// Automatic retries allowed per request.
pub const MAX_AUTO_RETRIES: u8 = 1;

/// Gateway statuses that are re-issued immediately.
pub const TRANSIENT_STATUS_CODES: &[u16] = &[502, 503, 504];

/// Whether `status` indicates a transient upstream problem.
#[inline]
pub fn is_transient(status: StatusCode) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status.as_u16())
}

/// Whether a response with `status` should be re-issued.
///
/// Only transient gateway statuses qualify, and only while the request's own
/// retry budget lasts. Timeouts, network errors, and 4xx never reach here.
pub fn should_retry(status: StatusCode, meta: &RequestMeta) -> bool {
    !meta.bare && is_transient(status) && meta.retry_count < MAX_AUTO_RETRIES
}
