//! Runner error type and process exit codes.

use savecheck_core::error::{FixtureError, ReadinessError, SavecheckError};
use savecheck_harness::HarnessError;

/// Errors that end a run before every scenario could report.
///
/// Scenario mismatches are not errors; they are carried in the report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The service never became ready, or the deadline passed first.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// The shared session could not be established.
    #[error("session fixture failed: {0}")]
    Fixture(#[from] FixtureError),

    /// Harness setup failure (HTTP client construction).
    #[error("harness error: {0}")]
    Harness(String),

    /// The JSON report could not be written.
    #[error("report error: {0}")]
    Report(String),
}

impl RunError {
    /// Map the error to a process exit code.
    ///
    /// `1` is reserved for runs that completed with scenario failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Readiness(_) => 3,
            Self::Fixture(_) => 4,
            Self::Harness(_) | Self::Report(_) => 10,
        }
    }
}

impl From<SavecheckError> for RunError {
    fn from(err: SavecheckError) -> Self {
        match err {
            SavecheckError::Config(e) => Self::Config(e.to_string()),
            SavecheckError::Fixture(e) => Self::Fixture(e),
            SavecheckError::Readiness(e) => Self::Readiness(e),
            other => Self::Harness(other.to_string()),
        }
    }
}

impl From<HarnessError> for RunError {
    fn from(err: HarnessError) -> Self {
        SavecheckError::from(err).into()
    }
}
