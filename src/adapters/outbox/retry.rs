//! Linear backoff between insert attempts.

use std::time::Duration;

use tokio::time;

use crate::ports::{ContextError, ExecContext};

/// Attempt ceiling and backoff schedule for one message.
///
/// The sleep before attempt `n + 1` is `n * backoff_unit`; there is no jitter
/// and no sleep after the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries,
            backoff_unit,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff after failed attempt number `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }

    /// Sleeps for `backoff` unless `ctx` stops first.
    pub async fn wait(&self, ctx: &ExecContext, backoff: Duration) -> Result<(), ContextError> {
        if backoff.is_zero() {
            return ctx.err().map_or(Ok(()), Err);
        }
        ctx.run(time::sleep(backoff)).await
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
pub fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
