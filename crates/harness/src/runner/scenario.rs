//! 시나리오 실행 -- 순서대로 단계를 실행하고 첫 불일치에서 멈춤
//!
//! 각 시나리오는 자신의 캡처 저장소와 리소스 핸들을 가지며 다른 시나리오와
//! 상태를 공유하지 않습니다. 공유되는 것은 세션 픽스처뿐입니다.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use savecheck_core::error::FixtureError;
use savecheck_core::types::{Outcome, ResourceHandle, Session, scalar_string};

use super::captures::Captures;
use super::step::Step;
use crate::client::ContractClient;
use crate::matcher::{describe, explain};
use crate::session::SessionFixture;

/// 시나리오가 사용하는 세션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionRequirement {
    /// 세션 없음 (등록/로그인/미인증 시나리오)
    None,
    /// 실행 전체에서 공유되는 세션
    #[default]
    Shared,
    /// 시나리오 전용 일회용 세션 (자격 증명을 무효화하는 시나리오)
    Disposable,
}

/// 이름 붙은 단계 목록
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub session: SessionRequirement,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// 공유 세션을 쓰는 빈 시나리오를 만듭니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: SessionRequirement::Shared,
            steps: Vec::new(),
        }
    }

    pub fn session(mut self, session: SessionRequirement) -> Self {
        self.session = session;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }
}

/// 실패한 단계 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    /// 0부터 시작하는 단계 번호 (세션 준비 실패는 `None`)
    pub index: Option<usize>,
    pub step: String,
    pub explanation: String,
    /// 요청을 보낸 경우의 관측 결과
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// 시나리오 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    /// 요청까지 보낸 단계 수
    pub steps_run: usize,
    pub failure: Option<StepFailure>,
    pub handles: Vec<ResourceHandle>,
    pub elapsed_ms: u64,
}

impl ScenarioResult {
    /// 실행되지 않은 시나리오 (실행 기한 초과 등)
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Skipped,
            steps_run: 0,
            failure: None,
            handles: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// 일회용 세션을 만들지 못한 시나리오
    pub fn setup_failed(name: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Failed,
            steps_run: 0,
            failure: Some(StepFailure {
                index: None,
                step: "session setup".to_owned(),
                explanation: explanation.into(),
                outcome: None,
            }),
            handles: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// 시나리오를 실행합니다.
///
/// 단계는 순서대로 실행되며 첫 불일치에서 멈춥니다. 템플릿 치환 실패
/// (캡처 누락, 세션 없음)와 캡처 대상 필드 누락도 해당 단계의 실패입니다.
pub async fn run_scenario(
    client: &ContractClient,
    session: Option<&Session>,
    scenario: &Scenario,
) -> ScenarioResult {
    let started = Instant::now();
    let mut captures = Captures::seeded(session);
    let mut handles = Vec::new();
    let owner = session.map(|s| s.identity.username.clone());
    let token = session.map(|s| s.token.as_str());

    let finish = |status, steps_run, failure, handles| ScenarioResult {
        name: scenario.name.clone(),
        status,
        steps_run,
        failure,
        handles,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    for (index, step) in scenario.steps.iter().enumerate() {
        let prepared = step
            .call
            .render(&captures, token)
            .and_then(|call| Ok((call, step.render_expectation(&captures)?)));
        let (call, expected) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(scenario = scenario.name.as_str(), step = step.name.as_str(), error = %e, "step could not be prepared");
                let failure = StepFailure {
                    index: Some(index),
                    step: step.name.clone(),
                    explanation: e.to_string(),
                    outcome: None,
                };
                return finish(ScenarioStatus::Failed, index, Some(failure), handles);
            }
        };

        let outcome = client.send(&call).await;
        let mismatches = explain(&outcome, &expected);
        if !mismatches.is_empty() {
            warn!(
                scenario = scenario.name.as_str(),
                step = step.name.as_str(),
                status = outcome.transport_status,
                code = ?outcome.business_code,
                "step outcome did not match"
            );
            let failure = StepFailure {
                index: Some(index),
                step: step.name.clone(),
                explanation: describe(&outcome, &mismatches),
                outcome: Some(outcome),
            };
            return finish(ScenarioStatus::Failed, index + 1, Some(failure), handles);
        }

        for capture in &step.captures {
            let Some(value) = outcome.field(&capture.path).cloned() else {
                let failure = StepFailure {
                    index: Some(index),
                    step: step.name.clone(),
                    explanation: format!("capture '{}' not found at {}", capture.name, capture.path),
                    outcome: Some(outcome),
                };
                return finish(ScenarioStatus::Failed, index + 1, Some(failure), handles);
            };
            if let Some(kind) = capture.resource {
                if let Some(id) = scalar_string(&value) {
                    handles.push(ResourceHandle {
                        kind,
                        id,
                        owner: owner.clone(),
                    });
                }
            }
            captures.insert(capture.name.clone(), value);
        }

        debug!(scenario = scenario.name.as_str(), step = step.name.as_str(), "step passed");
    }

    info!(scenario = scenario.name.as_str(), steps = scenario.steps.len(), "scenario passed");
    finish(ScenarioStatus::Passed, scenario.steps.len(), None, handles)
}

/// 세션 요구사항에 맞춰 시나리오를 실행하는 실행기
///
/// 공유 세션 획득 실패는 실행 전체를 중단해야 하므로 `Err`로 반환하고,
/// 일회용 세션 실패는 해당 시나리오의 실패로 기록합니다.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    client: ContractClient,
    fixture: Arc<SessionFixture>,
}

impl ScenarioRunner {
    pub fn new(client: ContractClient, fixture: Arc<SessionFixture>) -> Self {
        Self { client, fixture }
    }

    pub fn client(&self) -> &ContractClient {
        &self.client
    }

    pub fn fixture(&self) -> &SessionFixture {
        &self.fixture
    }

    pub async fn run(&self, scenario: &Scenario) -> Result<ScenarioResult, FixtureError> {
        match scenario.session {
            SessionRequirement::None => Ok(run_scenario(&self.client, None, scenario).await),
            SessionRequirement::Shared => {
                let session = self.fixture.get(&self.client).await?;
                Ok(run_scenario(&self.client, Some(session), scenario).await)
            }
            SessionRequirement::Disposable => {
                let identity = self.fixture.identity();
                match SessionFixture::disposable(&self.client, &identity.username, &identity.password)
                    .await
                {
                    Ok(session) => Ok(run_scenario(&self.client, Some(&session), scenario).await),
                    Err(e) => {
                        warn!(scenario = scenario.name.as_str(), error = %e, "disposable session setup failed");
                        Ok(ScenarioResult::setup_failed(&scenario.name, e.to_string()))
                    }
                }
            }
        }
    }
}
