//! Savecheck scenario catalog.
//!
//! Enumerates the named contract scenarios for the user and save resources:
//! success and failure paths of every operation, the shared resource
//! lifecycle, and one unauthorized check per authenticated endpoint.
//!
//! Scenario names are `/`-separated (`save/get/not-found`), so a name prefix
//! selects a whole group.

pub mod endpoints;
pub mod lifecycle;
pub mod save;
pub mod unauthorized;
pub mod user;

use savecheck_harness::Scenario;

/// The complete catalog in execution order: user, save, unauthorized.
pub fn all() -> Vec<Scenario> {
    let mut scenarios = user::scenarios();
    scenarios.extend(save::scenarios());
    scenarios.extend(unauthorized::scenarios());
    scenarios
}
