//! Run-level deadline.
//!
//! Validates that scenarios not yet started when the deadline passes are
//! reported as skipped, and that the run reports the deadline.

use std::time::Duration;

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::mock_service::{MockOptions, MockService};

use savecheck_harness::ScenarioStatus;
use savecheck_runner::Suite;

/// Slow service, one second deadline -> remaining scenarios skipped, exit 3.
#[tokio::test]
async fn test_e2e_deadline_skips_unstarted_scenarios() {
    // Given: Every request takes 200ms and the run has one second
    let options = MockOptions {
        latency: Duration::from_millis(200),
        ..MockOptions::default()
    };
    let (base_url, _service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url).deadline_secs(1).build();

    // When: Running the full catalog
    let report = Suite::from_config(config)
        .run()
        .await
        .expect("run should complete");

    // Then: Started scenarios finished, the rest were skipped
    assert!(report.deadline_exceeded);
    assert!(report.totals.skipped > 0);
    assert_eq!(report.totals.failed, 0);
    assert_eq!(report.exit_code(), 3);
    assert_eq!(report.results[0].status, ScenarioStatus::Passed);
    assert_eq!(
        report.results.last().map(|r| r.status),
        Some(ScenarioStatus::Skipped)
    );
}
