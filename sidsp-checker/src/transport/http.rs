//! reqwest-backed transport with retry and exponential backoff
//!
//! **Algorithm:**
//! 1. GET `{base_url}{path}?{params}` with the bearer token
//! 2. Retryable status (408, 500, 502, 503, 504) and attempts left: backoff, retry
//! 3. Network error and attempts left: backoff, retry
//! 4. Otherwise return the response verbatim, or a status-0 outcome when the
//!    last attempt was a network error
//!
//! **Backoff:** `backoff_base × 2^attempt` (0.5s, 1s with the defaults)

use super::{CallOutcome, Transport};
use crate::error::CheckerResult;
use crate::sequencer::QueryParams;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("sidsp-checker/", env!("CARGO_PKG_VERSION"));

/// Retry settings for transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = 1 + max_retries)
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub backoff_base: Duration,
    /// HTTP statuses treated as transient
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
            retry_statuses: vec![408, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry number `attempt + 1` (attempt is 0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// HTTP transport for the SIDSP API
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("retry", &self.retry)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport for `base_url` (no trailing slash) with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CheckerResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Send `Authorization: Bearer <token>` on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying client, shared with the login request
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn send_once(&self, url: &str, params: &QueryParams) -> reqwest::Result<CallOutcome> {
        let mut request = self
            .client
            .get(url)
            .query(&params.pairs())
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        Ok(CallOutcome::new(status, content_type, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &QueryParams) -> CallOutcome {
        let url = format!("{}{}", self.base_url, path);
        let max_retries = self.retry.max_retries;
        let mut attempt = 0u32;

        loop {
            match self.send_once(&url, params).await {
                Ok(outcome) => {
                    if self.retry.is_retryable_status(outcome.status) && attempt < max_retries {
                        let wait = self.retry.backoff(attempt);
                        warn!(
                            status = outcome.status,
                            path = %path,
                            wait_ms = wait.as_millis() as u64,
                            "[{}] Retrying (attempt {}/{})",
                            outcome.status,
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }

                    debug!(
                        path = %path,
                        status = outcome.status,
                        content_type = %outcome.content_type,
                        body_len = outcome.body.len(),
                        "SIDSP API response"
                    );
                    return outcome;
                }
                Err(e) => {
                    if attempt < max_retries {
                        let wait = self.retry.backoff(attempt);
                        warn!(
                            path = %path,
                            error = %e,
                            wait_ms = wait.as_millis() as u64,
                            "[Network Error] Retrying (attempt {}/{})",
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }

                    return CallOutcome::network_failure(format!(
                        "Network error: {}: {}",
                        error_kind(&e),
                        e
                    ));
                }
            }
        }
    }
}

fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectionError"
    } else if e.is_decode() || e.is_body() {
        "BodyError"
    } else {
        "RequestError"
    }
}
