//! Fan-out and race combinators over fallible futures.
//!
//! All combinators interleave their inputs inside the calling task; nothing
//! is spawned. Outputs that are collections keep input order regardless of
//! completion order.

use std::{
    fmt,
    pin::{Pin, pin},
    task::{Context, Poll},
};

use futures::future::{self, Either};
use pin_project_lite::pin_project;

/// Outcome of a fallible future, kept instead of short-circuiting on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T, E> {
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> Settled<T, E> {
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled(_))
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.is_fulfilled()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Settled<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Settled::Fulfilled(value),
            Err(error) => Settled::Rejected(error),
        }
    }
}

impl<T, E> From<Settled<T, E>> for Result<T, E> {
    fn from(settled: Settled<T, E>) -> Self {
        match settled {
            Settled::Fulfilled(value) => Ok(value),
            Settled::Rejected(error) => Err(error),
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Settled<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Settled::Fulfilled(value) => write!(f, "fulfilled: {value}"),
            Settled::Rejected(error) => write!(f, "rejected: {error}"),
        }
    }
}

pin_project! {
    /// Future returned by [`TaskExt::settle`](crate::task_ext::TaskExt::settle).
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Settle<F> {
        #[pin]
        future: F,
    }
}

impl<F> Settle<F> {
    pub fn new(future: F) -> Self {
        Self { future }
    }
}

impl<F, T, E> Future for Settle<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Settled<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().future.poll(cx).map(Settled::from)
    }
}

/// Waits for every future, failing as soon as any one of them fails.
///
/// On success the values are returned in input order. On failure the first
/// error observed is returned and the remaining futures are dropped.
pub async fn all<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    future::try_join_all(futures).await
}

/// Waits for every future and collects a [`Settled`] outcome for each one.
///
/// Never fails; the returned vector has one entry per input, in input order.
pub async fn settle_all<I, F, T, E>(futures: I) -> Vec<Settled<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    future::join_all(futures.into_iter().map(Settle::new)).await
}

/// Resolves to the output of whichever future settles first.
///
/// The loser is dropped without being polled again. If both are ready on the
/// same poll, `a` wins.
pub async fn race<A, B, T>(a: A, b: B) -> T
where
    A: Future<Output = T>,
    B: Future<Output = T>,
{
    let a = pin!(a);
    let b = pin!(b);
    match future::select(a, b).await {
        Either::Left((output, _)) | Either::Right((output, _)) => output,
    }
}

/// Resolves to the output of the first future to settle among `futures`,
/// together with its index.
///
/// Returns `None` when `futures` is empty.
pub async fn race_all<I, F>(futures: I) -> Option<(usize, F::Output)>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    let futures: Vec<_> = futures.into_iter().map(Box::pin).collect();
    if futures.is_empty() {
        return None;
    }
    let (output, index, _) = future::select_all(futures).await;
    Some((index, output))
}
