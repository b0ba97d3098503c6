//! The fixed, ordered set of control-flow demonstrations.
//!
//! Each scenario builds its operations from [`ScenarioConfig`] and exercises
//! one composition pattern. [`run_all`] executes them in [`Scenario::ALL`]
//! order and records a [`ScenarioReport`] for each; a failing scenario is
//! traced and the run moves on.

use std::{
    fmt,
    time::{Duration, Instant},
};

use futures::{TryFutureExt, future::try_join};
use tracing::{info, warn};

use crate::{
    Error,
    combinator::{self, Settled},
    operation::{OperationResult, SimulatedOperation},
    retry::RetryPolicy,
    timing::{millis, with_timeout},
};

/// Value produced by a fully successful [`chain`].
pub const CHAIN_RESULT: &str = "final result from promise chain";

/// Value substituted by [`chain`] when any step fails.
pub const CHAIN_FALLBACK: &str = "fallback value";

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Durations, failure probabilities and policies used by the scenarios.
///
/// This is an in-code value; nothing is read from files or the environment.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub chain_steps: [Duration; 2],
    pub chain_failure_probability: f64,

    pub parallel: [Duration; 3],
    pub parallel_failure_probability: f64,

    /// `(duration, failure probability)` per operation.
    pub settle: [(Duration, f64); 3],

    pub race: [Duration; 2],
    pub race_failure_probability: f64,

    pub timeout_operation: Duration,
    pub timeout_limit: Duration,

    pub retry_policy: RetryPolicy,
    pub retry_operation: Duration,
    pub retry_failure_probability: f64,

    pub pipeline_fetch: Duration,
    pub pipeline_process: [Duration; 2],
    pub pipeline_save: Duration,
    pub pipeline_failure_probability: f64,
}

impl ScenarioConfig {
    /// Applies the same failure probability to every operation.
    #[must_use]
    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.chain_failure_probability = probability;
        self.parallel_failure_probability = probability;
        for (_, p) in &mut self.settle {
            *p = probability;
        }
        self.race_failure_probability = probability;
        self.retry_failure_probability = probability;
        self.pipeline_failure_probability = probability;
        self
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            chain_steps: [ms(300), ms(250)],
            chain_failure_probability: 0.0,
            parallel: [ms(200), ms(300), ms(150)],
            parallel_failure_probability: 0.0,
            settle: [(ms(200), 0.3), (ms(100), 0.5), (ms(300), 0.2)],
            race: [ms(400), ms(200)],
            race_failure_probability: 0.0,
            timeout_operation: ms(500),
            timeout_limit: ms(250),
            retry_policy: RetryPolicy::new(3, ms(100)),
            retry_operation: ms(150),
            retry_failure_probability: 0.6,
            pipeline_fetch: ms(200),
            pipeline_process: [ms(150), ms(250)],
            pipeline_save: ms(100),
            pipeline_failure_probability: 0.0,
        }
    }
}

/// Two dependent steps composed with combinators.
///
/// Any failure is replaced by [`CHAIN_FALLBACK`]; the finalization step runs
/// either way.
pub async fn chain(cfg: &ScenarioConfig) -> String {
    let [first, second] = cfg.chain_steps;
    let p = cfg.chain_failure_probability;

    let value = SimulatedOperation::new("chain step 1", first)
        .failure_probability(p)
        .run()
        .and_then(|step| {
            info!(operation = %step, "chain: first step done");
            SimulatedOperation::new(format!("chain step 2 (after {})", step.name()), second)
                .failure_probability(p)
                .run()
        })
        .map_ok(|step| {
            info!(operation = %step, "chain: second step done");
            CHAIN_RESULT.to_string()
        })
        .unwrap_or_else(|error| {
            warn!(%error, "chain: recovered with fallback");
            CHAIN_FALLBACK.to_string()
        })
        .await;

    info!("chain: finalized");
    value
}

/// The [`chain`] dependency structure written as plain sequential awaits with
/// one failure handler around both steps.
pub async fn sequential_await(cfg: &ScenarioConfig) -> Result<String, Error> {
    let [first, second] = cfg.chain_steps;
    let p = cfg.chain_failure_probability;

    let steps = async {
        let a = SimulatedOperation::new("sequential step 1", first)
            .failure_probability(p)
            .run()
            .await?;
        info!(operation = %a, "sequential-await: first step done");

        let b = SimulatedOperation::new(format!("sequential step 2 (after {})", a.name()), second)
            .failure_probability(p)
            .run()
            .await?;
        info!(operation = %b, "sequential-await: second step done");

        Ok::<_, Error>(format!("{} -> {}", a.name(), b.name()))
    };

    match steps.await {
        Ok(summary) => Ok(summary),
        Err(error) => {
            warn!(%error, "sequential-await: failed");
            Err(error)
        }
    }
}

/// Three independent operations; fails as a whole if any one fails.
pub async fn parallel_all(cfg: &ScenarioConfig) -> Result<Vec<OperationResult>, Error> {
    let p = cfg.parallel_failure_probability;
    let operations = cfg.parallel.iter().enumerate().map(|(i, duration)| {
        SimulatedOperation::new(format!("parallel {}", i + 1), *duration)
            .failure_probability(p)
            .run()
    });

    let results = combinator::all(operations).await?;
    for result in &results {
        info!(operation = %result, "parallel-all: done");
    }
    Ok(results)
}

/// Three unreliable operations; every outcome is collected in input order.
pub async fn settle_all(cfg: &ScenarioConfig) -> Vec<Settled<OperationResult, Error>> {
    let operations = cfg
        .settle
        .iter()
        .enumerate()
        .map(|(i, (duration, p))| {
            SimulatedOperation::new(format!("settle {}", i + 1), *duration)
                .failure_probability(*p)
                .run()
        });

    let outcomes = combinator::settle_all(operations).await;
    for outcome in &outcomes {
        info!(%outcome, "settle-all: outcome");
    }
    outcomes
}

/// Two operations; the first to settle decides the outcome.
pub async fn race(cfg: &ScenarioConfig) -> Result<OperationResult, Error> {
    let [slow, fast] = cfg.race;
    let p = cfg.race_failure_probability;

    let winner = combinator::race(
        SimulatedOperation::new("race a", slow)
            .failure_probability(p)
            .run(),
        SimulatedOperation::new("race b", fast)
            .failure_probability(p)
            .run(),
    )
    .await?;

    info!(operation = %winner, "race: winner");
    Ok(winner)
}

/// One operation raced against [`ScenarioConfig::timeout_limit`].
pub async fn timeout(cfg: &ScenarioConfig) -> Result<OperationResult, Error> {
    let operation = SimulatedOperation::new("slow operation", cfg.timeout_operation);
    let result = with_timeout(operation.run(), cfg.timeout_limit).await?;
    info!(operation = %result, "timeout: finished in time");
    Ok(result)
}

/// One unreliable operation driven through the retry controller.
///
/// Returns the attempt that succeeded along with its result.
pub async fn retry(cfg: &ScenarioConfig) -> Result<(u32, OperationResult), Error> {
    let operation = SimulatedOperation::new("unreliable operation", cfg.retry_operation)
        .failure_probability(cfg.retry_failure_probability);

    let mut last_attempt = 0;
    let result = crate::retry::retry(cfg.retry_policy, |attempt| {
        info!(attempt, "retry: attempting");
        last_attempt = attempt;
        operation.run()
    })
    .await?;

    info!(attempt = last_attempt, operation = %result, "retry: succeeded");
    Ok((last_attempt, result))
}

/// Fetch, then two concurrent processing steps, then save.
pub async fn pipeline(cfg: &ScenarioConfig) -> Result<OperationResult, Error> {
    let p = cfg.pipeline_failure_probability;
    let [left, right] = cfg.pipeline_process;

    let fetched = SimulatedOperation::new("fetch", cfg.pipeline_fetch)
        .failure_probability(p)
        .run()
        .await?;
    info!(operation = %fetched, "pipeline: fetched");

    let (a, b) = try_join(
        SimulatedOperation::new(format!("process {} (a)", fetched.name()), left)
            .failure_probability(p)
            .run(),
        SimulatedOperation::new(format!("process {} (b)", fetched.name()), right)
            .failure_probability(p)
            .run(),
    )
    .await?;
    info!(first = %a, second = %b, "pipeline: processed");

    let saved = SimulatedOperation::new("save", cfg.pipeline_save)
        .failure_probability(p)
        .run()
        .await?;
    info!(operation = %saved, "pipeline: saved");
    Ok(saved)
}

/// The demonstrations, in the order [`run_all`] executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Chain,
    SequentialAwait,
    ParallelAll,
    SettleAll,
    Race,
    Timeout,
    Retry,
    Pipeline,
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Scenario::Chain,
        Scenario::SequentialAwait,
        Scenario::ParallelAll,
        Scenario::SettleAll,
        Scenario::Race,
        Scenario::Timeout,
        Scenario::Retry,
        Scenario::Pipeline,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Scenario::Chain => "chain",
            Scenario::SequentialAwait => "sequential-await",
            Scenario::ParallelAll => "parallel-all",
            Scenario::SettleAll => "settle-all",
            Scenario::Race => "race",
            Scenario::Timeout => "timeout",
            Scenario::Retry => "retry",
            Scenario::Pipeline => "pipeline",
        }
    }

    /// Runs the scenario and renders its outcome as a one-line summary.
    pub async fn run(self, cfg: &ScenarioConfig) -> Result<String, Error> {
        match self {
            Scenario::Chain => Ok(chain(cfg).await),
            Scenario::SequentialAwait => sequential_await(cfg).await,
            Scenario::ParallelAll => parallel_all(cfg).await.map(|results| {
                let names: Vec<_> = results.iter().map(OperationResult::name).collect();
                format!("all completed: {}", names.join(", "))
            }),
            Scenario::SettleAll => {
                let outcomes = settle_all(cfg).await;
                let fulfilled = outcomes.iter().filter(|o| o.is_fulfilled()).count();
                Ok(format!(
                    "{fulfilled} fulfilled, {} rejected",
                    outcomes.len() - fulfilled
                ))
            }
            Scenario::Race => race(cfg).await.map(|winner| format!("winner: {winner}")),
            Scenario::Timeout => timeout(cfg).await.map(|result| result.to_string()),
            Scenario::Retry => retry(cfg)
                .await
                .map(|(attempt, result)| format!("{result} on attempt {attempt}")),
            Scenario::Pipeline => pipeline(cfg).await.map(|saved| format!("saved: {saved}")),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one scenario produced and how long it took.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub outcome: Result<String, Error>,
    pub elapsed: Duration,
}

impl ScenarioReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs every scenario once, in [`Scenario::ALL`] order.
///
/// A failing scenario never stops the run; its error is kept in the report.
pub async fn run_all(cfg: &ScenarioConfig) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(Scenario::ALL.len());

    for scenario in Scenario::ALL {
        info!(%scenario, "running");
        let started = Instant::now();
        let outcome = scenario.run(cfg).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(summary) => {
                info!(%scenario, %summary, elapsed_ms = millis(elapsed), "completed");
            }
            Err(error) => {
                warn!(%scenario, %error, elapsed_ms = millis(elapsed), "failed");
            }
        }

        reports.push(ScenarioReport {
            scenario,
            outcome,
            elapsed,
        });
    }
    reports
}
