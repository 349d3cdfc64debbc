//! Outbound call pacing, one schedule per upstream provider.
//!
//! Every adapter call goes through [`RateLimiter::acquire`] with a provider
//! key before touching the network. Keys are independent: waiting for the
//! next news-search slot never delays a commit or quote fetch.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum spacing between calls that share a provider key.
///
/// The implementation reserves a slot on the provider's timeline while
/// holding the map lock, then sleeps until that slot **outside** the lock.
/// Concurrent callers therefore queue on the provider's timeline, not on
/// each other, and calls to other providers proceed untouched.
pub struct RateLimiter {
    spacing: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Create a limiter enforcing `spacing` between same-provider calls.
    pub fn new(spacing: Duration) -> Self {
        RateLimiter {
            spacing,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until the next call to `provider` is allowed.
    ///
    /// Only the calling task suspends; nothing blocks a thread. The first
    /// call for a key returns immediately.
    pub async fn acquire(&self, provider: &str) {
        let at = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let at = slots.get(provider).copied().map_or(now, |slot| slot.max(now));
            slots.insert(provider.to_string(), at + self.spacing);
            at
        };
        let wait = at.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            debug!(provider, wait_ms = wait.as_millis() as u64, "pacing outbound call");
        }
        tokio::time::sleep_until(at).await;
    }
}
