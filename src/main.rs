use asyncflow::{
    ScenarioConfig,
    logger::{self, LoggerConfig, LoggerError},
    scenario,
    timing::millis,
};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), LoggerError> {
    logger::init(&LoggerConfig::default())?;

    let reports = scenario::run_all(&ScenarioConfig::default()).await;

    info!("summary");
    for report in &reports {
        let elapsed_ms = millis(report.elapsed);
        match &report.outcome {
            Ok(_) => info!(scenario = %report.scenario, elapsed_ms, "ok"),
            Err(error) => warn!(scenario = %report.scenario, elapsed_ms, %error, "failed"),
        }
    }
    Ok(())
}
