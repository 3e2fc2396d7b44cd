//! Service readiness before any scenario runs.
//!
//! Validates that the probe tolerates a slow start, and that a service
//! which never answers aborts the run with the readiness exit code.

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::mock_service::{MockOptions, MockService};

use savecheck_core::error::ReadinessError;
use savecheck_runner::{RunError, Suite};

/// Address on which nothing is listening.
async fn closed_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}")
}

/// Service answers 503 a few times -> probe retries, run proceeds.
#[tokio::test]
async fn test_e2e_slow_start_is_tolerated() {
    // Given: A service that is ready on the fourth ping
    let options = MockOptions {
        ready_after: 3,
        ..MockOptions::default()
    };
    let (base_url, service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url)
        .max_attempts(5)
        .include(&["user/register/"])
        .build();

    // When: Running the suite
    let report = Suite::from_config(config)
        .run()
        .await
        .expect("run should complete");

    // Then: Probing stopped at the first ready answer
    assert_eq!(service.pings(), 4);
    assert!(report.all_passed());
}

/// Nothing listening -> readiness error after the configured attempts.
#[tokio::test]
async fn test_e2e_unreachable_service_aborts_run() {
    // Given: A closed port and two probe attempts
    let config = TestConfigBuilder::new(&closed_address().await)
        .max_attempts(2)
        .build();

    // When: Running the suite
    let err = Suite::from_config(config).run().await.unwrap_err();

    // Then: The run fails before any scenario with exit code 3
    assert!(
        matches!(
            err,
            RunError::Readiness(ReadinessError::Exhausted { attempts: 2, .. })
        ),
        "unexpected error: {err}"
    );
    assert_eq!(err.exit_code(), 3);
}

/// Deadline passes while still probing -> deadline error, not exhaustion.
#[tokio::test]
async fn test_e2e_deadline_during_probe_aborts_run() {
    // Given: A service that never becomes ready and a one second deadline
    let options = MockOptions {
        ready_after: usize::MAX,
        ..MockOptions::default()
    };
    let (base_url, _service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url)
        .max_attempts(100)
        .interval_secs(1)
        .deadline_secs(1)
        .build();

    // When: Running the suite
    let err = Suite::from_config(config).run().await.unwrap_err();

    // Then: The deadline is reported
    assert!(
        matches!(
            err,
            RunError::Readiness(ReadinessError::DeadlineExceeded { secs: 1 })
        ),
        "unexpected error: {err}"
    );
    assert_eq!(err.exit_code(), 3);
}
