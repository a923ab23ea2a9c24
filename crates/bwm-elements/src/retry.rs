//! Bounded retry with linear backoff.
//!
//! Modeled as an explicit loop with an injected classifier and sleeper
//! so the policy is testable without a network or a clock.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ElementsError, Result};

/// Attempts per call: the initial try plus three retries.
pub const MAX_ATTEMPTS: u32 = 4;

/// Base delay; attempt `n` waits `n * RETRY_BASE_DELAY` before retrying.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(350);

/// Retry policy: attempt budget and linear delay schedule.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl Backoff {
    /// Delay before the retry following attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Runs `operation` until it succeeds, fails non-retryably, or the
/// attempt budget is exhausted. The last error is returned as-is.
pub fn with_retry<T>(
    backoff: Backoff,
    is_retryable: impl Fn(&ElementsError) -> bool,
    mut sleep: impl FnMut(Duration),
    mut operation: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) if attempt < backoff.max_attempts && is_retryable(&error) => {
                let delay = backoff.delay_for(attempt);
                warn!(attempt, ?delay, %error, "retrying after transient failure");
                sleep(delay);
                attempt += 1;
            }
            Err(error) => {
                debug!(attempt, %error, "giving up");
                return Err(error);
            }
        }
    }
}
