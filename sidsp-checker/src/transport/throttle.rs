//! Rate limiting around a transport
//!
//! Keeps a minimum interval between consecutive API calls so a batch never
//! hammers the SIDSP API. Applied around the resolver, not inside it.

use super::{CallOutcome, Transport};
use crate::sequencer::QueryParams;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Hands out call slots at least `min_interval` apart
pub struct RateLimiter {
    min_interval: Duration,
    /// Earliest instant the next call may start
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Sleep until the next free slot, then reserve the one after it
    pub async fn wait(&self) {
        let mut next_slot = self.next_slot.lock().await;

        if let Some(slot) = *next_slot {
            let now = Instant::now();
            if slot > now {
                debug!(wait_ms = (slot - now).as_millis() as u64, "Rate limiting");
                sleep_until(slot).await;
            }
        }

        *next_slot = Some(Instant::now() + self.min_interval);
    }
}

/// Transport decorator that rate-limits every call
pub struct Throttled<T> {
    inner: T,
    limiter: RateLimiter,
}

impl<T: Transport> Throttled<T> {
    pub fn new(inner: T, min_interval: Duration) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(min_interval),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for Throttled<T> {
    async fn get(&self, path: &str, params: &QueryParams) -> CallOutcome {
        self.limiter.wait().await;
        self.inner.get(path, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Records when each call reached it and answers 418
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<std::sync::Mutex<Vec<(String, Instant)>>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn get(&self, path: &str, _params: &QueryParams) -> CallOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), Instant::now()));
            CallOutcome::new(418, "text/plain", "teapot")
        }
    }

    #[tokio::test]
    async fn test_throttled_passes_calls_through_in_order() {
        let recorder = Recorder::default();
        let throttled = Throttled::new(recorder.clone(), Duration::from_millis(1));
        let params = QueryParams::by_trn("1");

        let outcome = throttled.get("/a", &params).await;
        throttled.get("/b", &params).await;

        assert_eq!(outcome, CallOutcome::new(418, "text/plain", "teapot"));
        let paths: Vec<String> = recorder
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_throttled_spaces_consecutive_calls() {
        let recorder = Recorder::default();
        let throttled = Throttled::new(recorder.clone(), Duration::from_millis(50));
        let params = QueryParams::by_trn("1");

        for path in ["/a", "/b", "/c"] {
            throttled.get(path, &params).await;
        }

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        // Slots are reserved just before the inner call, so allow a little slack
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(45));
        }
    }

    #[tokio::test]
    async fn test_idle_time_counts_toward_interval() {
        let recorder = Recorder::default();
        let throttled = Throttled::new(recorder.clone(), Duration::from_millis(50));
        let params = QueryParams::by_trn("1");

        throttled.get("/a", &params).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let start = Instant::now();
        throttled.get("/b", &params).await;
        assert!(start.elapsed() < Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let recorder = Recorder::default();
        let throttled = Throttled::new(recorder.clone(), Duration::ZERO);
        let params = QueryParams::by_trn("1");

        let start = Instant::now();
        for _ in 0..20 {
            throttled.get("/a", &params).await;
        }

        assert_eq!(recorder.calls.lock().unwrap().len(), 20);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
