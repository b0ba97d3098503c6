//! The simulated unit of asynchronous work every scenario is built from.
//!
//! A [`SimulatedOperation`] waits for a fixed duration and then either
//! produces an [`OperationResult`] or fails with [`Error::Simulated`],
//! depending on a failure probability rolled after the delay.

use std::{fmt, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use tracing::debug;

use crate::{
    Error,
    timing::{millis, sleep},
};

/// Successful completion of a simulated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    name: String,
    duration: Duration,
    timestamp: DateTime<Utc>,
}

impl OperationResult {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        millis(self.duration)
    }

    /// Completion time, captured right after the delay elapsed.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Completion time rendered as an RFC 3339 string with millisecond precision.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}ms at {})",
            self.name,
            self.duration_ms(),
            self.timestamp_iso()
        )
    }
}

/// Description of a simulated operation.
///
/// The description is reusable: every call to [`run`](Self::run) starts a
/// fresh delay and rolls failure independently.
#[derive(Debug, Clone)]
pub struct SimulatedOperation {
    name: String,
    duration: Duration,
    failure_probability: f64,
}

impl SimulatedOperation {
    /// Creates an operation that always succeeds after `duration`.
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            failure_probability: 0.0,
        }
    }

    /// Sets the probability of failing once the delay has elapsed.
    ///
    /// Values are clamped into `[0, 1]`; NaN is treated as `0`.
    #[must_use]
    pub fn failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts the operation.
    ///
    /// The returned future owns everything it needs, so it can be spawned,
    /// raced or retried independently of `self`.
    pub fn run(&self) -> impl Future<Output = Result<OperationResult, Error>> + Send + use<> {
        let name = self.name.clone();
        let duration = self.duration;
        let failure_probability = self.failure_probability;

        async move {
            debug!(operation = %name, duration_ms = millis(duration), "started");
            sleep(duration).await;

            let failed = rand::thread_rng().gen_bool(failure_probability);
            if failed {
                debug!(operation = %name, "failed");
                return Err(Error::Simulated { name });
            }

            let result = OperationResult {
                name,
                duration,
                timestamp: Utc::now(),
            };
            debug!(operation = %result.name, "completed");
            Ok(result)
        }
    }
}

/// Shorthand for `SimulatedOperation::new(name, duration).failure_probability(p).run()`.
pub fn simulate(
    name: &str,
    duration: Duration,
    failure_probability: f64,
) -> impl Future<Output = Result<OperationResult, Error>> + Send + use<> {
    SimulatedOperation::new(name, duration)
        .failure_probability(failure_probability)
        .run()
}
