//! Fixed-budget retry with linear backoff.
//!
//! [`retry`] drives an operation factory until it succeeds or the
//! [`RetryPolicy`] runs out of attempts. The wait after failed attempt `n` is
//! `base_delay * n`: no exponential growth, no jitter, no cap.

use std::{fmt::Display, time::Duration};

use tracing::{debug, warn};

use crate::timing::{millis, sleep};

/// How many attempts to make and how long to back off between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A `max_attempts` of zero is raised to one.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        let max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        Self {
            max_attempts,
            base_delay,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// The wait after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Total wait incurred when every attempt fails.
    ///
    /// The last attempt is never followed by a wait, so this is
    /// `base_delay * (1 + 2 + ... + (max_attempts - 1))`.
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Runs `factory` until it succeeds or `policy` is exhausted.
///
/// The factory receives the attempt number, starting at 1. On success the
/// result is returned immediately. On failure the controller waits
/// [`RetryPolicy::backoff`] for that attempt and tries again; the error of the
/// final attempt is returned unchanged once the budget is spent. Intermediate
/// errors are traced and dropped.
///
/// # Example
/// ```
/// # use std::time::Duration;
/// # use asyncflow::retry::{RetryPolicy, retry};
/// # futures::executor::block_on(async {
/// let policy = RetryPolicy::new(3, Duration::from_millis(5));
/// let value = retry(policy, |attempt| async move {
///     if attempt < 2 { Err("not yet") } else { Ok(attempt) }
/// })
/// .await;
/// assert_eq!(value, Ok(2));
/// # });
/// ```
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut factory: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match factory(attempt).await {
            Ok(value) => {
                debug!(attempt, "attempt succeeded");
                return Ok(value);
            }
            Err(error) if attempt >= policy.max_attempts => {
                warn!(attempt, %error, "retry budget exhausted");
                return Err(error);
            }
            Err(error) => {
                let wait = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    %error,
                    wait_ms = millis(wait),
                    "attempt failed, backing off"
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
