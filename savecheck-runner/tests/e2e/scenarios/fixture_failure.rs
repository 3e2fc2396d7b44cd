//! Shared session fixture failure.
//!
//! Validates that a backend which cannot register the fixture user aborts
//! the run instead of failing every dependent scenario one by one.

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::mock_service::{MockOptions, MockService};

use savecheck_runner::{RunError, Suite};

/// Registration answers 500 -> fixture error, exit code 4.
#[tokio::test]
async fn test_e2e_fixture_failure_aborts_run() {
    // Given: A service whose registration always fails
    let options = MockOptions {
        broken_registration: true,
        ..MockOptions::default()
    };
    let (base_url, service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url)
        .include(&["user/login/"])
        .build();

    // When: Running scenarios that need the shared session
    let err = Suite::from_config(config).run().await.unwrap_err();

    // Then: The run aborts with the fixture error
    assert!(matches!(err, RunError::Fixture(_)), "unexpected error: {err}");
    assert_eq!(err.exit_code(), 4);
    assert!(err.to_string().contains("testuser"));
    assert_eq!(service.logins(), 0, "login must not be attempted");
}

/// Registration answers 500 while four workers need the shared session ->
/// one registration attempt, every waiting scenario sees the same failure.
#[tokio::test]
async fn test_e2e_fixture_failure_is_attempted_once_across_workers() {
    // Given: Broken registration and four workers
    let options = MockOptions {
        broken_registration: true,
        ..MockOptions::default()
    };
    let (base_url, service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url)
        .workers(4)
        .include(&["user/login/"])
        .build();

    // When: Running scenarios that need the shared session concurrently
    let err = Suite::from_config(config).run().await.unwrap_err();

    // Then: The fixture registered once and the run aborted
    assert!(matches!(err, RunError::Fixture(_)), "unexpected error: {err}");
    assert_eq!(err.exit_code(), 4);
    assert_eq!(service.registrations(), 1);
}

/// Disposable session failure -> only that scenario fails, run completes.
#[tokio::test]
async fn test_e2e_disposable_failure_fails_only_its_scenario() {
    // Given: Broken registration and a scenario on a disposable account
    let options = MockOptions {
        broken_registration: true,
        ..MockOptions::default()
    };
    let (base_url, _service) = MockService::spawn(options).await;
    let config = TestConfigBuilder::new(&base_url)
        .include(&["user/delete/success"])
        .build();

    // When: Running the suite
    let report = Suite::from_config(config)
        .run()
        .await
        .expect("run should complete");

    // Then: The scenario failed during session setup
    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.exit_code(), 1);
    let failure = report.results[0].failure.as_ref().expect("failure details");
    assert_eq!(failure.step, "session setup");
    assert_eq!(report.results[0].steps_run, 0);
}
