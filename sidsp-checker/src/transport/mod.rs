//! Transport seam between the resolver and the SIDSP API
//!
//! A [`Transport`] performs one logical GET and always answers with a
//! [`CallOutcome`]. Retries, backoff and rate limiting live below this seam,
//! so the resolver only ever sees the final outcome of a call.

pub mod http;
pub mod throttle;

use crate::sequencer::QueryParams;
use async_trait::async_trait;

pub use http::{HttpTransport, RetryPolicy};
pub use throttle::{RateLimiter, Throttled};

/// Status used for a network failure after retries are exhausted
pub const NETWORK_FAILURE: u16 = 0;

/// Result of one transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// HTTP status, or [`NETWORK_FAILURE`]
    pub status: u16,
    /// Content-Type header value, possibly empty
    pub content_type: String,
    /// Response body text, possibly empty
    pub body: String,
}

impl CallOutcome {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Outcome for a request that never produced an HTTP response
    pub fn network_failure(description: impl Into<String>) -> Self {
        Self::new(NETWORK_FAILURE, "", description)
    }
}

/// One GET against the SIDSP API
///
/// Implementations must not fail for ordinary HTTP-level errors: every status
/// the server sends is passed through, and exhausted network retries become
/// [`CallOutcome::network_failure`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &QueryParams) -> CallOutcome;
}

