//! 준비 상태 확인 -- 대상 서비스가 응답할 때까지 고정 간격 폴링
//!
//! 시도마다 제한 시간이 있는 GET을 보내고 200이면 성공입니다.
//! 재시도를 모두 소진하면 `false`를 반환하며, 호출자는 이를 실행 전체의
//! 치명적 전제조건 실패로 처리해야 합니다.

use std::time::Duration;

use tracing::{debug, info, warn};

use savecheck_core::codes;
use savecheck_core::config::ReadinessConfig;

use crate::client::{Call, ContractClient};
use crate::error::HarnessError;

/// 폴링 정책 (백오프 없이 고정 간격)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// 시도별 타임아웃
    pub attempt_timeout: Duration,
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 재시도 간격
    pub interval: Duration,
}

impl From<&ReadinessConfig> for ProbePolicy {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            attempt_timeout: config.attempt_timeout(),
            max_attempts: config.max_attempts,
            interval: config.interval(),
        }
    }
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self::from(&ReadinessConfig::default())
    }
}

/// 서비스가 준비될 때까지 기다립니다.
///
/// 마지막 시도 뒤에는 대기하지 않습니다.
pub async fn wait_ready(
    base_url: &str,
    probe_path: &str,
    policy: &ProbePolicy,
) -> Result<bool, HarnessError> {
    let client = ContractClient::new(base_url, policy.attempt_timeout)?;
    let probe = Call::get(probe_path);

    for attempt in 1..=policy.max_attempts {
        let outcome = client.send(&probe).await;
        if outcome.transport_status == codes::STATUS_OK {
            info!(attempt, url = client.base_url(), "service is ready");
            return Ok(true);
        }

        debug!(
            attempt,
            max_attempts = policy.max_attempts,
            status = outcome.transport_status,
            "service not ready yet"
        );

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(
        attempts = policy.max_attempts,
        url = client.base_url(),
        "service did not become ready"
    );
    Ok(false)
}
