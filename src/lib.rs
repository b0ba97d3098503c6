//! Composable asynchronous control flow over simulated operations.
//!
//! `asyncflow` demonstrates the common ways of composing fallible async work:
//! sequential chaining, parallel fan-out, settle-all collection, races,
//! timeouts and retry with linear backoff. All of it runs over a single
//! simulated I/O primitive that sleeps and then fails with a configurable
//! probability.
//!
//! The building blocks are executor agnostic and can be used on their own:
//! - [`timing`]: the [`Sleep`](timing::Sleep) suspension primitive and the
//!   [`Timeout`](timing::Timeout) wrapper
//! - [`operation`]: the [`SimulatedOperation`] unit of work
//! - [`combinator`]: `all`, `settle_all`, `race` and `race_all`
//! - [`retry`]: fixed-budget retry driven by a [`RetryPolicy`]
//! - [`task_ext`]: `.timeout()` and `.settle()` on any future
//!
//! [`scenario`] strings them together into the ordered demonstrations the
//! `asyncflow` binary runs.

mod error;

pub mod combinator;
pub mod logger;
pub mod operation;
pub mod retry;
pub mod scenario;
pub mod task_ext;
pub mod timing;

pub use combinator::Settled;
pub use error::Error;
pub use operation::{OperationResult, SimulatedOperation};
pub use retry::RetryPolicy;
pub use scenario::{Scenario, ScenarioConfig, ScenarioReport};
