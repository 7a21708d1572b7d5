//! Process-wide throttling for catalog requests.
//!
//! This module provides the [`RateGate`] struct which enforces a minimum
//! interval between any two calls into the remote catalog, regardless of which
//! component issues them. SIMBAD asks clients to stay at or below six queries
//! per second; callers exceeding that may have their IP temporarily blocked.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use simbad_report::RateGate;
//!
//! # async fn example() {
//! let gate = Arc::new(RateGate::new(Duration::from_millis(250)));
//!
//! // First acquisition proceeds immediately
//! gate.acquire().await;
//!
//! // Second acquisition waits until 250ms have passed since the first
//! gate.acquire().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Default minimum spacing between catalog calls: 0.25 s, i.e. 4 requests/second,
/// under SIMBAD's limit of six queries per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

/// Warning threshold for cumulative throttle delay over a run (60 seconds).
const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(60);

/// Minimum-interval gate shared by every catalog call site.
///
/// Designed to be wrapped in `Arc` and handed to each component that talks to
/// the catalog. The last-call timestamp is held under a `tokio::sync::Mutex`
/// for the whole check-sleep-update sequence, so two acquisitions can never
/// land closer together than the interval even when callers race.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,

    /// Whether throttling is disabled (for `--rate-limit 0`).
    disabled: bool,

    /// Time of the last successful acquisition; `None` until the first one.
    last_call: Mutex<Option<Instant>>,

    /// Total time spent waiting in [`RateGate::acquire`], in milliseconds.
    cumulative_delay_ms: AtomicU64,
}

impl RateGate {
    /// Creates a gate enforcing `interval` between acquisitions.
    #[must_use]
    #[instrument(skip_all, fields(interval_ms = interval.as_millis()))]
    pub fn new(interval: Duration) -> Self {
        debug!("creating rate gate");
        Self {
            interval,
            disabled: interval.is_zero(),
            last_call: Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Creates a gate that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether throttling is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the configured minimum interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the total time callers have spent waiting on this gate.
    #[must_use]
    pub fn cumulative_delay(&self) -> Duration {
        Duration::from_millis(self.cumulative_delay_ms.load(Ordering::SeqCst))
    }

    /// Waits until at least the interval has elapsed since the previous
    /// acquisition anywhere in the process, then records the current time.
    ///
    /// The first acquisition proceeds immediately. The wait is a timer sleep,
    /// never a busy poll, and there is no timeout: this always succeeds.
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let delay = self.interval.saturating_sub(elapsed);
                let cumulative = self.add_cumulative_delay(delay);

                debug!(
                    delay_ms = delay.as_millis(),
                    cumulative_ms = cumulative.as_millis(),
                    "throttling catalog call"
                );

                if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD
                    && cumulative.saturating_sub(delay) < CUMULATIVE_DELAY_WARNING_THRESHOLD
                {
                    warn!(
                        cumulative_delay_secs = cumulative.as_secs(),
                        "spent over a minute throttled - consider enabling the citation cache"
                    );
                }

                tokio::time::sleep(delay).await;
            }
        } else {
            debug!("first catalog call - no delay");
        }

        *last_call = Some(Instant::now());
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let new_total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            + delay_ms;
        Duration::from_millis(new_total)
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
