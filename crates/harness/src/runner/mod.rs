//! 리소스 수명주기 실행기
//!
//! - [`captures`]: 시나리오 범위 캡처 저장소와 `{{name}}` 템플릿
//! - [`step`]: 호출 템플릿, 인증 방식, 캡처 규칙
//! - [`scenario`]: fail-fast 시나리오 실행과 결과

pub mod captures;
pub mod scenario;
pub mod step;

pub use captures::Captures;
pub use scenario::{
    Scenario, ScenarioResult, ScenarioRunner, ScenarioStatus, SessionRequirement, StepFailure,
    run_scenario,
};
pub use step::{Auth, CallTemplate, Capture, Step};
