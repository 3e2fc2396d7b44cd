//! Suite orchestration -- readiness, session fixture, scenario scheduling.
//!
//! The [`Suite`] is the central coordinator of `savecheck-runner`.
//!
//! # Run Order
//!
//! 1. Validate configuration
//! 2. Wait for the service (fatal if it never answers)
//! 3. Run scenarios on up to `run.workers` concurrent tasks; the shared
//!    session is established lazily by the first scenario that needs it
//! 4. Assemble the report
//!
//! A run-level deadline covers every phase. Scenarios that have not started
//! when it passes are reported as skipped; scenarios already running finish.
//! A shared-fixture failure stops scheduling and aborts the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use savecheck_core::config::SavecheckConfig;
use savecheck_core::error::{FixtureError, ReadinessError};
use savecheck_harness::{
    ContractClient, ProbePolicy, Scenario, ScenarioResult, ScenarioRunner, SessionFixture,
    wait_ready,
};

use crate::error::RunError;
use crate::report::RunReport;

/// A configured run over a list of scenarios.
pub struct Suite {
    config: SavecheckConfig,
    scenarios: Vec<Scenario>,
}

impl Suite {
    /// Build a suite over the full catalog, filtered by `run.include`.
    pub fn from_config(config: SavecheckConfig) -> Self {
        let scenarios = savecheck_catalog::all()
            .into_iter()
            .filter(|s| config.run.selects(&s.name))
            .collect();
        Self::new(config, scenarios)
    }

    /// Build a suite over an explicit scenario list.
    pub fn new(config: SavecheckConfig, scenarios: Vec<Scenario>) -> Self {
        Self { config, scenarios }
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.name.as_str())
    }

    /// Execute the suite.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configuration is invalid
    /// - the service never became ready, or the deadline passed while waiting
    /// - the shared session could not be established
    ///
    /// Scenario failures are not errors; they are part of the report.
    pub async fn run(self) -> Result<RunReport, RunError> {
        self.config.validate()?;
        let started = Instant::now();

        let deadline = CancellationToken::new();
        let timer = self.config.run.deadline().map(|limit| {
            let deadline = deadline.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                warn!(secs = limit.as_secs(), "run deadline reached");
                deadline.cancel();
            })
        });

        let outcome = self.execute(&deadline, started).await;

        if let Some(timer) = timer {
            timer.abort();
        }
        outcome
    }

    async fn execute(
        self,
        deadline: &CancellationToken,
        started: Instant,
    ) -> Result<RunReport, RunError> {
        let target = &self.config.target;
        let policy = ProbePolicy::from(&self.config.readiness);

        info!(
            base_url = target.base_url.as_str(),
            scenarios = self.scenarios.len(),
            workers = self.config.run.workers,
            deadline = describe_deadline(self.config.run.deadline()).as_str(),
            "waiting for service"
        );
        let ready = tokio::select! {
            ready = wait_ready(&target.base_url, &target.probe_path, &policy) => ready?,
            _ = deadline.cancelled() => {
                return Err(ReadinessError::DeadlineExceeded {
                    secs: self.config.run.deadline_secs,
                }
                .into());
            }
        };
        if !ready {
            return Err(ReadinessError::Exhausted {
                url: format!("{}{}", target.base_url.trim_end_matches('/'), target.probe_path),
                attempts: policy.max_attempts,
            }
            .into());
        }

        let client = ContractClient::from_config(target)?;
        let fixture = Arc::new(SessionFixture::new(self.config.fixture.identity()));
        let runner = ScenarioRunner::new(client, fixture);

        let results = schedule(runner, self.scenarios, self.config.run.workers, deadline).await?;

        Ok(RunReport::new(
            target.base_url.clone(),
            results,
            deadline.is_cancelled(),
            elapsed_ms(started),
        ))
    }
}

/// Run `scenarios` on at most `workers` concurrent tasks.
///
/// Results keep catalog order. Scenarios never started (deadline or fatal
/// fixture failure) are reported as skipped.
pub async fn schedule(
    runner: ScenarioRunner,
    scenarios: Vec<Scenario>,
    workers: usize,
    deadline: &CancellationToken,
) -> Result<Vec<ScenarioResult>, RunError> {
    let names: Vec<String> = scenarios.iter().map(|s| s.name.clone()).collect();
    let mut results: Vec<Option<ScenarioResult>> = vec![None; names.len()];
    let mut fatal: Option<FixtureError> = None;

    // cancelled by the deadline or by a fixture failure
    let stop = deadline.child_token();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for (index, scenario) in scenarios.into_iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        if stop.is_cancelled() {
            break;
        }

        let runner = runner.clone();
        let stop = stop.clone();
        debug!(scenario = scenario.name.as_str(), index, "scheduling scenario");
        tasks.spawn(async move {
            let outcome = runner.run(&scenario).await;
            if outcome.is_err() {
                stop.cancel();
            }
            drop(permit);
            (index, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(result))) => results[index] = Some(result),
            Ok((index, Err(e))) => {
                error!(scenario = names[index].as_str(), error = %e, "shared session fixture failed");
                if fatal.is_none() {
                    fatal = Some(e);
                }
            }
            Err(e) => {
                return Err(RunError::Harness(format!("scenario task failed: {e}")));
            }
        }
    }

    if let Some(e) = fatal {
        return Err(e.into());
    }

    Ok(results
        .into_iter()
        .zip(names)
        .map(|(result, name)| result.unwrap_or_else(|| ScenarioResult::skipped(name)))
        .collect())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Deadline as configured, for logging.
pub fn describe_deadline(limit: Option<Duration>) -> String {
    match limit {
        Some(limit) => format!("{}s", limit.as_secs()),
        None => "none".to_owned(),
    }
}
