//! Savecheck runner library.
//!
//! This library exposes the runner's modules for integration testing.
//! In production, `savecheck-runner` is used as a binary (main.rs).

pub mod error;
pub mod logging;
pub mod report;
pub mod suite;

pub use error::RunError;
pub use report::{RunReport, Totals};
pub use suite::Suite;
