//! Test configuration builder for E2E tests.
//!
//! Provides [`TestConfigBuilder`] for creating `SavecheckConfig` instances
//! pointed at a mock service, with readiness tuned for fast local runs.

use std::path::Path;

use savecheck_core::config::SavecheckConfig;

/// Builder for constructing test-friendly `SavecheckConfig` instances.
///
/// By default the probe retries a handful of times without waiting, requests
/// time out after two seconds and the run deadline is one minute.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new(&base_url)
///     .workers(4)
///     .include(&["save/"])
///     .build();
/// ```
#[allow(dead_code)]
pub struct TestConfigBuilder {
    config: SavecheckConfig,
}

#[allow(dead_code)]
impl TestConfigBuilder {
    pub fn new(base_url: &str) -> Self {
        let mut config = SavecheckConfig::default();
        config.target.base_url = base_url.to_owned();
        config.target.request_timeout_secs = 2;

        config.readiness.attempt_timeout_secs = 1;
        config.readiness.max_attempts = 5;
        config.readiness.interval_secs = 0;

        config.run.deadline_secs = 60;

        Self { config }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.run.workers = workers;
        self
    }

    /// `0` disables the deadline.
    pub fn deadline_secs(mut self, secs: u64) -> Self {
        self.config.run.deadline_secs = secs;
        self
    }

    pub fn include(mut self, prefixes: &[&str]) -> Self {
        self.config.run.include = prefixes.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    pub fn report_path(mut self, path: &Path) -> Self {
        self.config.run.report_path = path.to_string_lossy().into_owned();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.readiness.max_attempts = attempts;
        self
    }

    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.config.readiness.interval_secs = secs;
        self
    }

    pub fn fixture_user(mut self, username: &str) -> Self {
        self.config.fixture.username = username.to_owned();
        self
    }

    pub fn build(self) -> SavecheckConfig {
        self.config
    }
}
