//! Run report -- per-scenario results and totals.
//!
//! The report is always logged; when `run.report_path` is set it is also
//! written as pretty-printed JSON.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use savecheck_harness::{ScenarioResult, ScenarioStatus};

use crate::error::RunError;

/// Scenario counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Totals {
    fn count(results: &[ScenarioResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut totals, result| {
                match result.status {
                    ScenarioStatus::Passed => totals.passed += 1,
                    ScenarioStatus::Failed => totals.failed += 1,
                    ScenarioStatus::Skipped => totals.skipped += 1,
                }
                totals
            },
        )
    }
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub totals: Totals,
    /// Whether the run deadline cut the run short.
    pub deadline_exceeded: bool,
    pub elapsed_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn new(
        base_url: impl Into<String>,
        results: Vec<ScenarioResult>,
        deadline_exceeded: bool,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            totals: Totals::count(&results),
            deadline_exceeded,
            elapsed_ms,
            results,
        }
    }

    /// True when every scenario ran and passed.
    pub fn all_passed(&self) -> bool {
        self.totals.passed == self.totals.total
    }

    /// Process exit code for a run that completed.
    ///
    /// Scenario failures win over an exceeded deadline.
    pub fn exit_code(&self) -> u8 {
        if self.totals.failed > 0 {
            1
        } else if self.deadline_exceeded || self.totals.skipped > 0 {
            3
        } else {
            0
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results
            .iter()
            .filter(|r| r.status == ScenarioStatus::Failed)
    }

    /// Log one line per failed scenario and a summary.
    pub fn log(&self) {
        for result in self.failures() {
            match &result.failure {
                Some(failure) => warn!(
                    scenario = result.name.as_str(),
                    step = failure.step.as_str(),
                    index = ?failure.index,
                    "scenario failed\n{}",
                    failure.explanation
                ),
                None => warn!(scenario = result.name.as_str(), "scenario failed"),
            }
        }

        info!(
            total = self.totals.total,
            passed = self.totals.passed,
            failed = self.totals.failed,
            skipped = self.totals.skipped,
            deadline_exceeded = self.deadline_exceeded,
            elapsed_ms = self.elapsed_ms,
            "run finished"
        );
    }

    /// Write the report as pretty JSON to `path`.
    pub async fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RunError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RunError::Report(format!("failed to serialize report: {e}")))?;
        tokio::fs::write(path, json).await.map_err(|e| {
            RunError::Report(format!("failed to write {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}
