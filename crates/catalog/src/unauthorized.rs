//! Generated "no bearer header" scenarios, one per authenticated endpoint.

use savecheck_core::types::ExpectedOutcome;
use savecheck_harness::{Scenario, SessionRequirement, Step};

use crate::endpoints::{self, Endpoint};

pub const PREFIX: &str = "unauthorized/";

fn scenario(endpoint: &Endpoint) -> Scenario {
    Scenario::new(format!("{PREFIX}{}", endpoint.name))
        .session(SessionRequirement::None)
        .step(Step::new(
            format!("{} {} without bearer", endpoint.method, endpoint.path),
            endpoint.plausible_call(),
            ExpectedOutcome::unauthorized(),
        ))
}

pub fn scenarios() -> Vec<Scenario> {
    endpoints::authenticated().map(scenario).collect()
}
