//! Exponential-backoff retry decorator for item sources.
//!
//! Adapters report failure inside the returned [`SourceBatch`] rather than as
//! `Err`, so the decorator retries whenever the batch carries an error and
//! hands the final batch back unchanged once attempts run out — the
//! aggregator still sees the terminal error (and any diagnostic rows) exactly
//! as the bare adapter produced them.
//!
//! # Retry Strategy
//!
//! - Retries are off by default (`max_retries = 0` makes the wrapper a
//!   pass-through); the flag exists for scheduled runs where a transient
//!   provider hiccup would otherwise leave a hole in the day's artifacts
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use std::fmt;
use std::time::{Duration, Instant};

use rand::{rng, Rng};
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::sources::{ItemSource, SourceBatch};

/// Wrapper that adds exponential backoff retry logic to any [`ItemSource`].
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying source to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up. Zero disables.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: ItemSource,
{
    /// Create a new retry wrapper around an existing [`ItemSource`].
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying source to wrap
    /// * `max_retries` - Maximum number of retry attempts (0 = pass-through)
    /// * `base_delay` - Initial delay between retries (1 second recommended)
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ItemSource for RetryFetch<T>
where
    T: ItemSource,
{
    #[instrument(level = "info", skip_all)]
    async fn fetch_items(&self, query: &str, limit: usize) -> SourceBatch {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let batch = self.inner.fetch_items(query, limit).await;
            let Some(err) = &batch.error else {
                return batch;
            };

            attempt += 1;
            let attempt_dt = attempt_t0.elapsed();
            let total_dt = total_t0.elapsed();

            if attempt > self.max_retries {
                if self.max_retries > 0 {
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        error = %err,
                        "fetch_items() exhausted retries"
                    );
                }
                return batch;
            }

            // backoff calc
            let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
            if delay > self.max_delay {
                delay = self.max_delay;
            }
            let jitter_ms: u64 = rng().random_range(0..=250);
            let delay = delay + Duration::from_millis(jitter_ms);

            warn!(
                attempt,
                max = self.max_retries,
                elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                elapsed_ms_total = total_dt.as_millis() as u128,
                ?delay,
                error = %err,
                "fetch_items() attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
