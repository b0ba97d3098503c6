use std::time::Duration;

use thiserror::Error;

/// Failure produced by a simulated operation or by the timeout wrapper.
///
/// Every failure in this crate is synthetic and recoverable. The two variants
/// only differ in what the message describes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The named operation rolled a failure after its delay elapsed.
    #[error("[{name}] failed (simulated)")]
    Simulated { name: String },

    /// The wrapped operation did not settle within the time limit.
    #[error("timeout after {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

impl Error {
    /// A simulated failure of the operation called `name`.
    pub fn simulated(name: impl Into<String>) -> Self {
        Error::Simulated { name: name.into() }
    }

    /// A timeout that fired once `after` had elapsed.
    pub fn timeout(after: Duration) -> Self {
        Error::Timeout { after }
    }

    /// Returns `true` for [`Error::Timeout`].
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
