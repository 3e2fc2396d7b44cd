//! 하네스 에러 타입
//!
//! [`HarnessError`]는 클라이언트 생성, 템플릿 치환, 세션 획득 실패를 표현합니다.
//! `From<HarnessError> for SavecheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use savecheck_core::error::{FixtureError, SavecheckError};

/// 하네스 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// HTTP 클라이언트 생성 실패
    #[error("http client build failed: {0}")]
    ClientBuild(String),

    /// 템플릿이 아직 캡처되지 않은 값을 참조함
    #[error("template references uncaptured value '{name}'")]
    MissingCapture {
        /// 참조된 캡처 이름
        name: String,
    },

    /// 캡처 값이 문자열로 치환될 수 없음 (객체, 배열, null)
    #[error("captured value '{name}' is not a scalar")]
    NonScalarCapture {
        /// 캡처 이름
        name: String,
    },

    /// 세션이 필요한 단계인데 시나리오에 세션이 없음
    #[error("step requires a session but the scenario has none")]
    NoSession,

    /// 세션 픽스처 에러
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

impl From<HarnessError> for SavecheckError {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Fixture(e) => SavecheckError::Fixture(e),
            other => SavecheckError::Harness(other.to_string()),
        }
    }
}
