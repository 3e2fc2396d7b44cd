//! Savecheck 하네스 -- 계약 검증 엔진
//!
//! 원격 서비스의 HTTP 표면만을 대상으로 시나리오를 실행하고
//! 전송 상태와 업무 코드를 함께 검증합니다.
//!
//! # 구성 요소 (의존 순서)
//!
//! 1. [`probe`]: 준비 상태 확인
//! 2. [`client`]: HTTP 계약 클라이언트
//! 3. [`session`]: 한 번만 초기화되는 세션 픽스처
//! 4. [`matcher`]: 결과 매처
//! 5. [`runner`]: 리소스 수명주기 실행기

pub mod client;
pub mod error;
pub mod matcher;
pub mod probe;
pub mod runner;
pub mod session;

pub use client::{Call, ContractClient};
pub use error::HarnessError;
pub use matcher::{Mismatch, describe, explain, matches};
pub use probe::{ProbePolicy, wait_ready};
pub use runner::{
    Auth, CallTemplate, Captures, Scenario, ScenarioResult, ScenarioRunner, ScenarioStatus,
    SessionRequirement, Step, StepFailure, run_scenario,
};
pub use session::SessionFixture;
