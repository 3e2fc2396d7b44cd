//! 설정 관리 -- savecheck.toml 파싱 및 런타임 설정
//!
//! [`SavecheckConfig`]는 하네스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`SAVECHECK_TARGET_BASE_URL=http://...` 형식)
//! 2. 설정 파일 (`savecheck.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), savecheck_core::error::SavecheckError> {
//! use savecheck_core::config::SavecheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SavecheckConfig::load("savecheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SavecheckConfig::parse("[target]\nbase_url = \"http://10.0.0.5:8888\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SavecheckError};
use crate::types::Identity;

/// Savecheck 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavecheckConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 대상 서비스 설정
    #[serde(default)]
    pub target: TargetConfig,
    /// 준비 상태 확인 설정
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// 세션 픽스처 계정 설정
    #[serde(default)]
    pub fixture: FixtureConfig,
    /// 실행 설정
    #[serde(default)]
    pub run: RunConfig,
}

impl SavecheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SavecheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SavecheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SavecheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SavecheckError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SavecheckError> {
        toml::from_str(toml_str).map_err(|e| {
            SavecheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SAVECHECK_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SAVECHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SAVECHECK_GENERAL_LOG_FORMAT");

        // Target
        override_string(&mut self.target.base_url, "SAVECHECK_TARGET_BASE_URL");
        override_string(&mut self.target.probe_path, "SAVECHECK_TARGET_PROBE_PATH");
        override_u64(
            &mut self.target.request_timeout_secs,
            "SAVECHECK_TARGET_REQUEST_TIMEOUT_SECS",
        );

        // Readiness
        override_u64(
            &mut self.readiness.attempt_timeout_secs,
            "SAVECHECK_READINESS_ATTEMPT_TIMEOUT_SECS",
        );
        override_u32(
            &mut self.readiness.max_attempts,
            "SAVECHECK_READINESS_MAX_ATTEMPTS",
        );
        override_u64(
            &mut self.readiness.interval_secs,
            "SAVECHECK_READINESS_INTERVAL_SECS",
        );

        // Fixture
        override_string(&mut self.fixture.username, "SAVECHECK_FIXTURE_USERNAME");
        override_string(&mut self.fixture.password, "SAVECHECK_FIXTURE_PASSWORD");
        override_string(&mut self.fixture.nickname, "SAVECHECK_FIXTURE_NICKNAME");
        override_string(&mut self.fixture.email, "SAVECHECK_FIXTURE_EMAIL");

        // Run
        override_usize(&mut self.run.workers, "SAVECHECK_RUN_WORKERS");
        override_u64(&mut self.run.deadline_secs, "SAVECHECK_RUN_DEADLINE_SECS");
        override_csv(&mut self.run.include, "SAVECHECK_RUN_INCLUDE");
        override_string(&mut self.run.report_path, "SAVECHECK_RUN_REPORT_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SavecheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if !(self.target.base_url.starts_with("http://")
            || self.target.base_url.starts_with("https://"))
        {
            return Err(invalid(
                "target.base_url",
                "must start with http:// or https://".to_owned(),
            ));
        }

        if !self.target.probe_path.starts_with('/') {
            return Err(invalid("target.probe_path", "must start with '/'".to_owned()));
        }

        if self.target.request_timeout_secs == 0 {
            return Err(invalid(
                "target.request_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.readiness.attempt_timeout_secs == 0 {
            return Err(invalid(
                "readiness.attempt_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.readiness.max_attempts == 0 {
            return Err(invalid(
                "readiness.max_attempts",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.fixture.username.is_empty() || self.fixture.password.is_empty() {
            return Err(invalid(
                "fixture",
                "username and password must not be empty".to_owned(),
            ));
        }

        if self.run.workers == 0 {
            return Err(invalid("run.workers", "must be greater than 0".to_owned()));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> SavecheckError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 대상 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// 서비스 기본 URL
    pub base_url: String,
    /// 준비 상태 확인 경로
    pub probe_path: String,
    /// 요청별 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl TargetConfig {
    /// 요청별 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8888".to_owned(),
            probe_path: "/ping".to_owned(),
            request_timeout_secs: 5,
        }
    }
}

/// 준비 상태 확인 설정
///
/// 고정 간격 재시도입니다 (백오프 없음).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// 시도별 타임아웃 (초)
    pub attempt_timeout_secs: u64,
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 재시도 간격 (초)
    pub interval_secs: u64,
}

impl ReadinessConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: 5,
            max_attempts: 30,
            interval_secs: 2,
        }
    }
}

/// 세션 픽스처 계정 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// 테스트 계정 사용자명
    pub username: String,
    /// 테스트 계정 비밀번호
    pub password: String,
    /// 등록 시 닉네임 (비어있으면 생략)
    pub nickname: String,
    /// 등록 시 이메일 (비어있으면 생략)
    pub email: String,
}

impl FixtureConfig {
    /// 설정에서 픽스처 계정 정보를 만듭니다.
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            password: self.password.clone(),
            nickname: non_empty(&self.nickname),
            email: non_empty(&self.email),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            username: "testuser".to_owned(),
            password: "testpass".to_owned(),
            nickname: String::new(),
            email: String::new(),
        }
    }
}

/// 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 동시에 실행할 시나리오 수
    pub workers: usize,
    /// 실행 전체 제한 시간 (초, 0이면 제한 없음)
    pub deadline_secs: u64,
    /// 실행할 시나리오 이름 접두사 (비어있으면 전체)
    pub include: Vec<String>,
    /// JSON 리포트 경로 (비어있으면 기록하지 않음)
    pub report_path: String,
}

impl RunConfig {
    /// 제한 시간 (`deadline_secs == 0`이면 `None`)
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }

    /// 시나리오 이름이 `include` 필터를 통과하는지 확인합니다.
    pub fn selects(&self, scenario_name: &str) -> bool {
        self.include.is_empty()
            || self
                .include
                .iter()
                .any(|prefix| scenario_name.starts_with(prefix.as_str()))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            deadline_secs: 300,
            include: Vec::new(),
            report_path: String::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
