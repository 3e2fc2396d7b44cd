//! 시나리오 단계 정의 -- 호출 템플릿, 기대 결과, 캡처

use reqwest::Method;
use serde_json::Value;

use savecheck_core::types::{BodyCheck, ExpectedOutcome, FieldPath, ResourceKind};

use super::captures::Captures;
use crate::client::Call;
use crate::error::HarnessError;

/// 단계별 인증 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Authorization 헤더 없음
    None,
    /// 시나리오 세션의 토큰
    Session,
    /// 고정 토큰 (무효 토큰 시나리오용)
    Token(String),
    /// 이전 단계에서 캡처한 토큰
    Captured(String),
}

/// 캡처 값을 참조할 수 있는 호출 명세
#[derive(Debug, Clone, PartialEq)]
pub struct CallTemplate {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: Auth,
}

impl CallTemplate {
    /// 기본 인증 방식은 [`Auth::Session`]입니다.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: Auth::Session,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn anonymous(self) -> Self {
        self.auth(Auth::None)
    }

    /// 캡처 값과 세션 토큰으로 실제 요청을 만듭니다.
    pub fn render(&self, captures: &Captures, session_token: Option<&str>) -> Result<Call, HarnessError> {
        let mut call = Call::new(self.method.clone(), captures.render_str(&self.path)?);
        for (key, value) in &self.query {
            call = call.query(key.clone(), captures.render_str(value)?);
        }
        if let Some(body) = &self.body {
            call = call.json(captures.render_value(body)?);
        }
        call.bearer = match &self.auth {
            Auth::None => None,
            Auth::Session => Some(session_token.ok_or(HarnessError::NoSession)?.to_owned()),
            Auth::Token(token) => Some(token.clone()),
            Auth::Captured(name) => Some(captures.get_string(name)?),
        };
        Ok(call)
    }
}

/// 응답에서 값을 꺼내 이후 단계에 넘기는 규칙
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub name: String,
    pub path: FieldPath,
    /// 리소스 ID인 경우 그 종류 (결과에 핸들로 기록됨)
    pub resource: Option<ResourceKind>,
}

/// 시나리오의 한 단계
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub call: CallTemplate,
    pub expect: ExpectedOutcome,
    pub captures: Vec<Capture>,
}

impl Step {
    pub fn new(name: impl Into<String>, call: CallTemplate, expect: ExpectedOutcome) -> Self {
        Self {
            name: name.into(),
            call,
            expect,
            captures: Vec::new(),
        }
    }

    /// 응답 필드를 `name`으로 캡처합니다.
    pub fn capture(mut self, name: impl Into<String>, path: FieldPath) -> Self {
        self.captures.push(Capture {
            name: name.into(),
            path,
            resource: None,
        });
        self
    }

    /// 생성된 리소스의 ID를 캡처합니다.
    pub fn capture_resource(
        mut self,
        name: impl Into<String>,
        path: FieldPath,
        kind: ResourceKind,
    ) -> Self {
        self.captures.push(Capture {
            name: name.into(),
            path,
            resource: Some(kind),
        });
        self
    }

    /// 기대 결과의 본문 검사 값에 캡처를 적용합니다.
    pub fn render_expectation(&self, captures: &Captures) -> Result<ExpectedOutcome, HarnessError> {
        let mut expected = self.expect.clone();
        for check in &mut expected.body {
            match check {
                BodyCheck::Equals(_, value) | BodyCheck::ArrayContains { value, .. } => {
                    *value = captures.render_value(value)?;
                }
                _ => {}
            }
        }
        Ok(expected)
    }
}
