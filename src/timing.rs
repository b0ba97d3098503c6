//! Timing utilities for asynchronous workflows.
//!
//! Provides the crate's suspension primitive, [`Sleep`], and the [`Timeout`]
//! wrapper that races a future against it. Both are executor agnostic: the
//! deadline is registered with the `async-io` timer driver, so they can be
//! awaited from tokio, smol or `block_on` alike.

use std::{
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use async_io::Timer;
use pin_project_lite::pin_project;
use tracing::debug;

use crate::Error;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
#[must_use]
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A future that completes once a fixed deadline has passed.
///
/// The deadline is computed when the `Sleep` is created, not when it is first
/// polled. While pending, the deadline sits in the shared timer driver, which
/// wakes the task that polled it last; other futures on the same executor keep
/// making progress in the meantime. Dropping a pending `Sleep` removes its
/// deadline from the driver.
///
/// A zero duration completes on the first poll without registering anything.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Sleep {
    deadline: Instant,
    timer: Timer,
}

impl Sleep {
    /// Creates a `Sleep` that completes `duration` from now.
    pub fn new(duration: Duration) -> Self {
        let deadline = Instant::now() + duration;
        Self {
            deadline,
            timer: Timer::at(deadline),
        }
    }

    /// The instant at which this sleep completes.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_elapsed() {
            return Poll::Ready(());
        }
        Pin::new(&mut self.timer).poll(cx).map(|_| ())
    }
}

/// Suspends the current task for `duration`.
///
/// ```
/// # use std::time::Duration;
/// # futures::executor::block_on(async {
/// asyncflow::timing::sleep(Duration::from_millis(10)).await;
/// # });
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

pin_project! {
    /// A future that races another future against a time limit.
    ///
    /// Resolves to `Ok` with the inner output if the inner future settles
    /// first, or to [`Error::Timeout`] once the limit elapses. When both are
    /// ready in the same poll, the inner future wins. The countdown starts
    /// when the `Timeout` is created, ***not*** when it is awaited.
    ///
    /// The losing inner future is dropped together with the `Timeout`; it is
    /// never polled again after the limit is reached.
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Timeout<F> {
        #[pin]
        future: F,
        deadline: Sleep,
        limit: Duration,
    }
}

impl<F> Timeout<F> {
    /// Creates a new `Timeout` that runs `future` with the given time limit.
    ///
    /// For a more ergonomic way to create a timeout-wrapped future, consider using
    /// the [`timeout()`](../task_ext/trait.TaskExt.html#method.timeout) operator.
    pub fn new(future: F, limit: Duration) -> Self {
        Timeout {
            future,
            deadline: Sleep::new(limit),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Consumes the `Timeout` and returns the inner future.
    pub fn inner(self) -> F {
        self.future
    }
}

impl<F> Future for Timeout<F>
where
    F: Future,
{
    type Output = Result<F::Output, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if let Poll::Ready(output) = this.future.poll(cx) {
            return Poll::Ready(Ok(output));
        }
        if Pin::new(this.deadline).poll(cx).is_ready() {
            debug!(limit_ms = millis(*this.limit), "timeout reached");
            return Poll::Ready(Err(Error::timeout(*this.limit)));
        }
        Poll::Pending
    }
}

/// Runs a fallible future under a time limit, folding the timeout into the
/// same error type.
pub async fn with_timeout<T, F>(future: F, limit: Duration) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    Timeout::new(future, limit).await?
}
