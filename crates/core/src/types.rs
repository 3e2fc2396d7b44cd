//! 도메인 타입 -- 호출 결과, 기대 결과, 세션, 리소스 핸들
//!
//! 응답 형식의 차이(`code` 0/200, `user`/`data` 봉투, `message`/`Message` 키)는
//! 이 모듈에서 한 번만 흡수합니다. 개별 시나리오는 이 차이를 알 필요가 없습니다.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes;

/// 업무 코드를 담는 JSON 키 (현재 / 레거시)
const CODE_KEYS: [&str; 2] = ["code", "Code"];

/// 메시지를 담는 JSON 키 (현재 / 레거시)
const MESSAGE_KEYS: [&str; 2] = ["message", "Message"];

/// HTTP 호출 한 번의 정규화된 결과
///
/// 생성 후 변경되지 않습니다. 연결 실패나 타임아웃도 에러가 아니라
/// `transport_status == 0`인 `Outcome`으로 표현됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// HTTP 상태 코드 (0 = 도달 불가)
    pub transport_status: u16,
    /// 본문에 포함된 업무 코드
    pub business_code: Option<i64>,
    /// 본문에 포함된 메시지
    pub message: Option<String>,
    /// 파싱된 본문 (JSON이 아니면 원문 문자열)
    pub body: Value,
}

impl Outcome {
    /// 도달 불가 결과를 만듭니다.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            transport_status: 0,
            business_code: None,
            message: None,
            body: Value::String(reason.into()),
        }
    }

    /// 응답 원문에서 결과를 만듭니다.
    ///
    /// Content-Type이 없거나 JSON 계열일 때만 파싱을 시도합니다.
    /// 파싱에 실패하면 업무 코드와 메시지는 `None`이고 원문이 `body`에 남습니다.
    pub fn from_text(status: u16, content_type: Option<&str>, text: &str) -> Self {
        let json_allowed = content_type.is_none_or(|ct| ct.to_ascii_lowercase().contains("json"));
        if json_allowed {
            if let Ok(body) = serde_json::from_str::<Value>(text) {
                return Self::from_json(status, body);
            }
        }
        Self {
            transport_status: status,
            business_code: None,
            message: None,
            body: Value::String(text.to_owned()),
        }
    }

    /// 파싱된 JSON 본문에서 결과를 만듭니다.
    pub fn from_json(status: u16, body: Value) -> Self {
        let business_code = CODE_KEYS
            .iter()
            .find_map(|key| body.get(key))
            .and_then(code_value);
        let message = MESSAGE_KEYS
            .iter()
            .find_map(|key| body.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            transport_status: status,
            business_code,
            message,
            body,
        }
    }

    /// 도달 불가 결과인지 확인합니다.
    pub fn is_unreachable(&self) -> bool {
        self.transport_status == 0
    }

    /// 업무 코드가 성공(200 또는 레거시 0)인지 확인합니다.
    pub fn is_business_success(&self) -> bool {
        self.business_code
            .is_some_and(|code| codes::SUCCESS_CODES.contains(&code))
    }

    /// 본문에서 필드를 찾습니다.
    pub fn field(&self, path: &FieldPath) -> Option<&Value> {
        path.resolve(&self.body)
    }

    /// 본문 필드를 문자열로 읽습니다. 숫자 ID도 문자열로 변환합니다.
    pub fn field_string(&self, path: &FieldPath) -> Option<String> {
        self.field(path).and_then(scalar_string)
    }
}

fn code_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 스칼라 JSON 값을 문자열로 변환합니다 (`null`, 배열, 객체는 `None`).
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 본문 필드 경로 -- 대체 가능한 JSON pointer 목록
///
/// 앞에서부터 처음 존재하는 경로를 사용합니다.
/// `user`/`data` 봉투 차이는 [`FieldPath::enveloped`]로 표현합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// 단일 JSON pointer 경로
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(vec![pointer.into()])
    }

    /// 최상위 필드 경로 (`save_id` -> `/save_id`)
    pub fn top(field: &str) -> Self {
        Self::new(format!("/{field}"))
    }

    /// 여러 대체 경로
    pub fn any<I, S>(pointers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(pointers.into_iter().map(Into::into).collect())
    }

    /// 봉투 객체 안의 필드 (`["user", "data"]`, `nickname` -> `/user/nickname | /data/nickname`)
    pub fn enveloped(envelopes: &[&str], field: &str) -> Self {
        Self::any(envelopes.iter().map(|env| format!("/{env}/{field}")))
    }

    /// 본문에서 값을 찾습니다.
    pub fn resolve<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        self.0.iter().find_map(|pointer| body.pointer(pointer))
    }

    pub fn pointers(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

/// 업무 코드 기대값
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodeExpectation {
    /// 검사하지 않음
    #[default]
    Any,
    /// 집합 중 하나여야 함 (코드가 없으면 실패)
    OneOf(BTreeSet<i64>),
    /// 집합에 속하지 않아야 함 (코드가 없으면 통과)
    NoneOf(BTreeSet<i64>),
}

/// 메시지 판정 조건
#[derive(Clone)]
pub enum MessagePredicate {
    /// 정확히 일치
    Equals(String),
    /// 후보 중 하나라도 포함 (과거 문구 두 가지를 모두 허용)
    ContainsAny(Vec<String>),
    /// 대소문자 무시 포함
    ContainsAnyIgnoreCase(Vec<String>),
    /// 사용자 정의 판정
    Custom {
        description: String,
        check: Arc<dyn Fn(&str) -> bool + Send + Sync>,
    },
}

impl MessagePredicate {
    pub fn contains_any<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ContainsAny(needles.into_iter().map(Into::into).collect())
    }

    pub fn contains_any_ignore_case<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ContainsAnyIgnoreCase(needles.into_iter().map(Into::into).collect())
    }

    pub fn custom(
        description: impl Into<String>,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    /// 메시지를 판정합니다.
    pub fn test(&self, message: &str) -> bool {
        match self {
            Self::Equals(expected) => message == expected,
            Self::ContainsAny(needles) => needles.iter().any(|n| message.contains(n.as_str())),
            Self::ContainsAnyIgnoreCase(needles) => {
                let lowered = message.to_lowercase();
                needles
                    .iter()
                    .any(|n| lowered.contains(n.to_lowercase().as_str()))
            }
            Self::Custom { check, .. } => check(message),
        }
    }
}

impl fmt::Debug for MessagePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for MessagePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(expected) => write!(f, "equals {expected:?}"),
            Self::ContainsAny(needles) => write!(f, "contains any of {needles:?}"),
            Self::ContainsAnyIgnoreCase(needles) => {
                write!(f, "contains any of {needles:?} (case-insensitive)")
            }
            Self::Custom { description, .. } => write!(f, "{description}"),
        }
    }
}

/// 본문 검사 조건
///
/// 값에는 `{{name}}` 템플릿을 쓸 수 있으며, 실행기가 캡처 값으로 치환한 뒤 판정합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyCheck {
    /// 필드 존재 (`null` 포함)
    Present(FieldPath),
    /// 필드가 존재하고 비어있지 않음
    NonEmpty(FieldPath),
    /// 필드 값이 일치
    Equals(FieldPath, Value),
    /// 필드가 배열
    IsArray(FieldPath),
    /// 숫자 필드가 최솟값 이상
    AtLeast(FieldPath, i64),
    /// 배열 안에 `field == value`인 요소가 있음
    ArrayContains {
        array: FieldPath,
        field: String,
        value: Value,
    },
}

impl fmt::Display for BodyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(path) => write!(f, "{path} present"),
            Self::NonEmpty(path) => write!(f, "{path} non-empty"),
            Self::Equals(path, value) => write!(f, "{path} == {value}"),
            Self::IsArray(path) => write!(f, "{path} is array"),
            Self::AtLeast(path, min) => write!(f, "{path} >= {min}"),
            Self::ArrayContains {
                array,
                field,
                value,
            } => write!(f, "{array} contains element with {field} == {value}"),
        }
    }
}

/// 기대 결과 명세
///
/// 상태 코드 집합은 백엔드의 비일관성을 그대로 반영합니다
/// (예: 파라미터 누락에 400 또는 200). 임의로 좁히지 않습니다.
#[derive(Debug, Clone)]
pub struct ExpectedOutcome {
    /// 허용 HTTP 상태 코드
    pub status_set: BTreeSet<u16>,
    /// 업무 코드 기대값
    pub code: CodeExpectation,
    /// 메시지 판정 (없으면 검사하지 않음)
    pub message: Option<MessagePredicate>,
    /// 본문 검사
    pub body: Vec<BodyCheck>,
}

impl ExpectedOutcome {
    /// 허용 상태 코드로 시작합니다.
    pub fn status(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            status_set: statuses.into_iter().collect(),
            code: CodeExpectation::Any,
            message: None,
            body: Vec::new(),
        }
    }

    /// 전송 200 + 업무 코드 성공(200/0)
    pub fn success() -> Self {
        Self::status([codes::STATUS_OK]).codes(codes::SUCCESS_CODES)
    }

    /// 인증 실패 (401/403, 업무 코드는 보장되지 않음)
    pub fn unauthorized() -> Self {
        Self::status(codes::AUTH_FAILURE_STATUSES)
    }

    /// 리소스 없음 (전송 404 + 업무 코드 404)
    pub fn not_found() -> Self {
        Self::status([codes::STATUS_NOT_FOUND]).codes([codes::NOT_FOUND])
    }

    /// 엄격한 검증 실패 (전송 400 + 업무 코드 400)
    pub fn bad_request() -> Self {
        Self::status([codes::STATUS_BAD_REQUEST]).codes([codes::BAD_REQUEST])
    }

    /// 업무 코드가 `codes` 중 하나여야 합니다.
    pub fn codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.code = CodeExpectation::OneOf(codes.into_iter().collect());
        self
    }

    /// 업무 코드가 `codes`에 속하지 않아야 합니다.
    pub fn not_codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.code = CodeExpectation::NoneOf(codes.into_iter().collect());
        self
    }

    pub fn message(mut self, predicate: MessagePredicate) -> Self {
        self.message = Some(predicate);
        self
    }

    pub fn message_eq(self, expected: impl Into<String>) -> Self {
        self.message(MessagePredicate::Equals(expected.into()))
    }

    pub fn message_contains_any<I, S>(self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message(MessagePredicate::contains_any(needles))
    }

    pub fn check(mut self, check: BodyCheck) -> Self {
        self.body.push(check);
        self
    }
}

/// 테스트 계정 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            nickname: None,
            email: None,
        }
    }
}

/// 인증된 세션
///
/// 한 번 얻은 토큰은 실행이 끝날 때까지 유효한 것으로 취급합니다.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
    pub user_id: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.identity.username)
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Save,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Save => write!(f, "save"),
        }
    }
}

/// 시나리오 안에서 생성된 리소스
///
/// 같은 시나리오의 이후 단계에서만 사용하며 시나리오 간에 공유하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub id: String,
    /// 소유 세션의 사용자명 (세션 없이 생성된 경우 `None`)
    pub owner: Option<String>,
}
