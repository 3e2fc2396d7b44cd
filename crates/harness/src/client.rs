//! HTTP 계약 클라이언트 -- 요청 전송 및 결과 정규화
//!
//! [`ContractClient`]는 모든 요청에 고정 타임아웃을 적용하고,
//! 응답을 [`Outcome`]으로 정규화합니다. 연결 실패와 타임아웃은
//! 에러로 전파하지 않고 `transport_status == 0`인 결과로 반환합니다.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use savecheck_core::config::TargetConfig;
use savecheck_core::types::{Outcome, Session};

use crate::error::HarnessError;

/// 전송할 요청 한 건
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Bearer 토큰 (없으면 Authorization 헤더를 아예 보내지 않음)
    pub bearer: Option<String>,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
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

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// HTTP 계약 클라이언트
///
/// `reqwest::Client`는 내부적으로 `Arc`이므로 복제 비용이 작습니다.
#[derive(Debug, Clone)]
pub struct ContractClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ContractClient {
    /// 기본 URL과 요청별 타임아웃으로 클라이언트를 생성합니다.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HarnessError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarnessError::ClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// `[target]` 설정에서 클라이언트를 생성합니다.
    pub fn from_config(target: &TargetConfig) -> Result<Self, HarnessError> {
        Self::new(target.base_url.clone(), target.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 요청을 보내고 결과를 정규화합니다. 절대 실패하지 않습니다.
    pub async fn send(&self, call: &Call) -> Outcome {
        let url = format!("{}{}", self.base_url, call.path);

        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .timeout(self.timeout);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        if let Some(token) = &call.bearer {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = describe_transport_error(&e);
                warn!(method = %call.method, url = url.as_str(), reason = reason.as_str(), "request did not complete");
                return Outcome::unreachable(reason);
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                // 상태 코드는 받았으므로 본문만 비운 채 결과를 만듭니다.
                warn!(method = %call.method, url = url.as_str(), error = %e, "failed to read response body");
                String::new()
            }
        };

        let outcome = Outcome::from_text(status, content_type.as_deref(), &text);
        debug!(
            method = %call.method,
            path = call.path.as_str(),
            status,
            code = ?outcome.business_code,
            "contract call completed"
        );
        outcome
    }

    /// 요청을 보냅니다. `session`이 있으면 Bearer 헤더를 붙입니다.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        session: Option<&Session>,
    ) -> Outcome {
        let mut call = Call::new(method, path);
        for (key, value) in query {
            call = call.query(*key, *value);
        }
        call.body = body;
        call.bearer = session.map(|s| s.token.clone());
        self.send(&call).await
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
