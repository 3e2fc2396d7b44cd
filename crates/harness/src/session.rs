//! 세션 픽스처 -- 실행 전체에서 한 번만 등록/로그인하는 인증 세션
//!
//! [`SessionFixture`]는 처음 접근할 때 초기화되고 이후에는 읽기 전용입니다.
//! 여러 시나리오가 동시에 처음 접근해도 등록/로그인은 한 번만 일어납니다.
//!
//! # 프로토콜
//!
//! 1. 등록 시도 -- 업무 코드가 성공(200/0) 또는 "이미 존재함"(1001)이면 계속
//! 2. 로그인 -- 전송 200 + 비어있지 않은 토큰 필수
//! 3. `{token, user_id}` 캐시
//!
//! 자격 증명을 무효화하는 시나리오(회원 탈퇴, 비밀번호 변경)는 공유 세션을
//! 건드리지 않고 [`SessionFixture::disposable`]로 만든 일회용 세션을 사용합니다.

use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use savecheck_core::codes;
use savecheck_core::error::FixtureError;
use savecheck_core::types::{FieldPath, Identity, Outcome, Session};

use crate::client::{Call, ContractClient};

/// 등록 엔드포인트
pub const REGISTER_PATH: &str = "/api/user/register";

/// 로그인 엔드포인트
pub const LOGIN_PATH: &str = "/api/user/login";

/// 한 번만 초기화되는 공유 세션
#[derive(Debug)]
pub struct SessionFixture {
    identity: Identity,
    /// 첫 시도의 결과 (실패도 그대로 보관)
    session: OnceCell<Result<Session, FixtureError>>,
}

impl SessionFixture {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            session: OnceCell::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// 공유 세션을 반환합니다. 첫 호출에서만 등록/로그인을 수행합니다.
    ///
    /// 실패한 결과도 보관되므로 이후 호출자는 같은 에러를 받고,
    /// 등록/로그인은 성공 여부와 관계없이 최대 한 번입니다.
    pub async fn get(&self, client: &ContractClient) -> Result<&Session, FixtureError> {
        self.session
            .get_or_init(|| establish(client, &self.identity))
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    /// 이미 성립된 세션 (없거나 실패했으면 `None`)
    pub fn cached(&self) -> Option<&Session> {
        self.session.get().and_then(|outcome| outcome.as_ref().ok())
    }

    /// 무작위 계정으로 일회용 세션을 만듭니다.
    ///
    /// 새 계정이므로 등록은 반드시 성공해야 합니다.
    pub async fn disposable(
        client: &ContractClient,
        prefix: &str,
        password: &str,
    ) -> Result<Session, FixtureError> {
        let identity = Identity::new(random_username(prefix), password);
        let outcome = register(client, &identity).await;
        if !outcome.is_business_success() {
            return Err(register_error(&identity, &outcome));
        }
        login(client, &identity).await
    }
}

/// 등록 후 로그인하여 세션을 만듭니다.
pub async fn establish(client: &ContractClient, identity: &Identity) -> Result<Session, FixtureError> {
    let outcome = register(client, identity).await;
    let code = outcome.business_code;
    if outcome.is_business_success() {
        info!(username = identity.username.as_str(), "fixture user registered");
    } else if code == Some(codes::USER_EXISTS) {
        debug!(username = identity.username.as_str(), "fixture user already exists, logging in");
    } else {
        return Err(register_error(identity, &outcome));
    }

    let session = login(client, identity).await?;
    info!(
        username = identity.username.as_str(),
        user_id = ?session.user_id,
        "fixture session established"
    );
    Ok(session)
}

/// 등록 요청을 보냅니다.
pub async fn register(client: &ContractClient, identity: &Identity) -> Outcome {
    client
        .send(&Call::post(REGISTER_PATH).json(register_body(identity)))
        .await
}

/// 로그인하여 세션을 만듭니다.
pub async fn login(client: &ContractClient, identity: &Identity) -> Result<Session, FixtureError> {
    let outcome = client
        .send(&Call::post(LOGIN_PATH).json(json!({
            "username": identity.username,
            "password": identity.password,
        })))
        .await;

    let login_error = |reason: &str| FixtureError::Login {
        username: identity.username.clone(),
        status: outcome.transport_status,
        reason: reason.to_owned(),
    };

    if outcome.transport_status != codes::STATUS_OK {
        return Err(login_error(
            outcome.message.as_deref().unwrap_or("unexpected transport status"),
        ));
    }

    let token = outcome
        .field_string(&FieldPath::any(["/token", "/data/token"]))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| login_error("response carries no token"))?;
    let user_id = outcome.field_string(&FieldPath::any(["/user_id", "/data/user_id"]));

    Ok(Session {
        identity: identity.clone(),
        token,
        user_id,
    })
}

/// 충돌하지 않는 사용자명을 만듭니다 (`testuser_3f2a9c1b7d04`).
pub fn random_username(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..12])
}

fn register_body(identity: &Identity) -> Value {
    let mut body = Map::new();
    body.insert("username".to_owned(), json!(identity.username));
    body.insert("password".to_owned(), json!(identity.password));
    if let Some(nickname) = &identity.nickname {
        body.insert("nickname".to_owned(), json!(nickname));
    }
    if let Some(email) = &identity.email {
        body.insert("email".to_owned(), json!(email));
    }
    Value::Object(body)
}

fn register_error(identity: &Identity, outcome: &Outcome) -> FixtureError {
    FixtureError::Register {
        username: identity.username.clone(),
        status: outcome.transport_status,
        code: outcome.business_code,
        message: outcome
            .message
            .clone()
            .unwrap_or_else(|| outcome.body.to_string()),
    }
}
