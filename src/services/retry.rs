//! Backoff schedule for [`FcmClient::send_with_retry`](super::client::FcmClient::send_with_retry).
//!
//! Delays grow exponentially from `min_delay` up to `max_delay`, with optional
//! jitter. The schedule never shrinks from one attempt to the next and never
//! yields a zero delay.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::Duration;

const MIN_POSITIVE_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub factor: f32,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { min_delay: Duration::from_millis(100), max_delay: Duration::from_secs(10), factor: 2.0, jitter: true }
    }
}

impl RetryPolicy {
    /// Backoff builder allowing `max_attempts` sends in total.
    #[must_use]
    pub fn schedule(&self, max_attempts: usize) -> RetrySchedule {
        RetrySchedule { policy: *self, retries: max_attempts.saturating_sub(1) }
    }
}

/// [`BackoffBuilder`] for a fixed number of retries under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    retries: usize,
}

impl BackoffBuilder for RetrySchedule {
    type Backoff = MonotonicBackoff;

    fn build(self) -> Self::Backoff {
        let min_delay = self.policy.min_delay.max(MIN_POSITIVE_DELAY);
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(self.policy.max_delay.max(min_delay))
            .with_factor(self.policy.factor.max(1.0))
            .with_max_times(self.retries);
        if self.policy.jitter {
            builder = builder.with_jitter();
        }

        MonotonicBackoff { inner: builder.build(), floor: min_delay }
    }
}

/// Clamps each delay to at least the previous one.
#[derive(Debug)]
pub struct MonotonicBackoff {
    inner: ExponentialBackoff,
    floor: Duration,
}

impl Iterator for MonotonicBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        let delay = self.inner.next()?.max(self.floor);
        self.floor = delay;
        Some(delay)
    }
}
