//! 에러 타입 -- 실행 단위별 에러 정의
//!
//! 시나리오 단위의 불일치는 에러가 아니라 결과 값(`ScenarioResult`)으로 기록됩니다.
//! 여기 정의된 에러는 실행 전체를 중단시키는 상황만 표현합니다.

/// Savecheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SavecheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 세션 픽스처 에러 (세션을 만들 수 없으면 실행 전체가 중단됨)
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// 대상 서비스 준비 상태 에러
    #[error("readiness error: {0}")]
    Readiness(#[from] ReadinessError),

    /// 하네스 내부 에러 (클라이언트 생성 실패 등)
    #[error("harness error: {0}")]
    Harness(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 세션 픽스처 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum FixtureError {
    /// 등록 응답이 성공도, "이미 존재함"도 아님
    #[error("register rejected for '{username}': status {status}, code {code:?}: {message}")]
    Register {
        username: String,
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// 로그인 실패 또는 토큰 누락
    #[error("login failed for '{username}': status {status}: {reason}")]
    Login {
        username: String,
        status: u16,
        reason: String,
    },
}

/// 대상 서비스 준비 상태 에러
#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    /// 재시도 횟수 소진
    #[error("service at {url} not ready after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },

    /// 실행 전체 제한 시간 초과
    #[error("run deadline of {secs}s exceeded")]
    DeadlineExceeded { secs: u64 },
}
