//! Savecheck 공통 타입, 에러, 설정
//!
//! 원격 user + save 서비스에 대한 HTTP 계약 검증 하네스의 기반 크레이트입니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: `savecheck.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 실행 중단 에러 분류
//! - [`types`]: `Outcome`, `ExpectedOutcome`, `Session` 등 데이터 모델
//! - [`codes`]: 업무 코드 / 전송 상태 상수

pub mod codes;
pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, FixtureError, ReadinessError, SavecheckError};

// 설정
pub use config::SavecheckConfig;

// 도메인 타입
pub use types::{
    BodyCheck, CodeExpectation, ExpectedOutcome, FieldPath, Identity, MessagePredicate, Outcome,
    ResourceHandle, ResourceKind, Session,
};
