use std::time::Duration;

use crate::{combinator::Settle, timing::Timeout};

/// Extend `Future` with time-based and outcome-collecting operations.
pub trait TaskExt: Future {
    /// Races the future against `time_limit`, starting the countdown now.
    fn timeout(self, time_limit: Duration) -> Timeout<Self>
    where
        Self: Sized,
    {
        Timeout::new(self, time_limit)
    }

    /// Turns a fallible future into one that resolves to a
    /// [`Settled`](crate::combinator::Settled) outcome.
    fn settle<T, E>(self) -> Settle<Self>
    where
        Self: Sized + Future<Output = Result<T, E>>,
    {
        Settle::new(self)
    }
}

impl<T> TaskExt for T where T: Future {}
