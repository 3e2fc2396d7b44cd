//! JSON report output.

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::mock_service::{MockOptions, MockService};

use savecheck_runner::Suite;

/// Completed run -> report written to the configured path.
#[tokio::test]
async fn test_e2e_report_written_to_configured_path() {
    // Given: A report path in a temp directory
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("savecheck-report.json");
    let (base_url, _service) = MockService::spawn(MockOptions::default()).await;
    let config = TestConfigBuilder::new(&base_url)
        .include(&["unauthorized/"])
        .report_path(&path)
        .build();
    let report_path = config.run.report_path.clone();

    // When: Running the suite and writing the report
    let report = Suite::from_config(config)
        .run()
        .await
        .expect("run should complete");
    report
        .write_json(&report_path)
        .await
        .expect("report should be written");

    // Then: The file holds the totals and one entry per scenario
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read report"))
            .expect("report is JSON");
    assert_eq!(written["base_url"], base_url.as_str());
    assert_eq!(written["totals"]["total"], 9);
    assert_eq!(written["totals"]["passed"], 9);
    assert_eq!(written["results"].as_array().map(Vec::len), Some(9));
    assert_eq!(written["results"][0]["status"], "passed");
}
