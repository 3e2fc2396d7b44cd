//! 캡처 저장소 및 `{{name}}` 템플릿 치환
//!
//! 문자열 전체가 `{{name}}` 하나뿐이면 캡처된 JSON 값을 타입 그대로 넣고,
//! 다른 텍스트와 섞여 있으면 스칼라 문자열로 치환합니다.

use std::collections::HashMap;

use serde_json::Value;

use savecheck_core::types::{Session, scalar_string};

use crate::error::HarnessError;

/// 세션 정보가 시드되는 캡처 이름
pub const SESSION_USERNAME: &str = "session.username";
pub const SESSION_PASSWORD: &str = "session.password";
pub const SESSION_TOKEN: &str = "session.token";
pub const SESSION_USER_ID: &str = "session.user_id";

/// 시나리오마다 새로 만들어지는 고유 접미사
pub const UNIQUE: &str = "unique";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// 시나리오 범위의 캡처 값
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captures {
    values: HashMap<String, Value>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// 고유 접미사와 (있다면) 세션 정보로 초기화합니다.
    pub fn seeded(session: Option<&Session>) -> Self {
        let mut captures = Self::new();
        let unique = uuid::Uuid::new_v4().simple().to_string();
        captures.insert(UNIQUE, Value::String(unique[..12].to_owned()));

        if let Some(session) = session {
            captures.insert(
                SESSION_USERNAME,
                Value::String(session.identity.username.clone()),
            );
            captures.insert(
                SESSION_PASSWORD,
                Value::String(session.identity.password.clone()),
            );
            captures.insert(SESSION_TOKEN, Value::String(session.token.clone()));
            if let Some(user_id) = &session.user_id {
                captures.insert(SESSION_USER_ID, Value::String(user_id.clone()));
            }
        }
        captures
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// 캡처 값을 문자열로 읽습니다.
    pub fn get_string(&self, name: &str) -> Result<String, HarnessError> {
        let value = self.get(name).ok_or_else(|| HarnessError::MissingCapture {
            name: name.to_owned(),
        })?;
        scalar_string(value).ok_or_else(|| HarnessError::NonScalarCapture {
            name: name.to_owned(),
        })
    }

    /// 문자열 안의 모든 `{{name}}`을 치환합니다.
    pub fn render_str(&self, template: &str) -> Result<String, HarnessError> {
        let mut rendered = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                break;
            };
            rendered.push_str(&rest[..start]);
            let name = after_open[..end].trim();
            rendered.push_str(&self.get_string(name)?);
            rest = &after_open[end + CLOSE.len()..];
        }

        rendered.push_str(rest);
        Ok(rendered)
    }

    /// JSON 값 안의 모든 문자열 템플릿을 재귀적으로 치환합니다.
    pub fn render_value(&self, template: &Value) -> Result<Value, HarnessError> {
        match template {
            Value::String(s) => match whole_placeholder(s) {
                Some(name) => self.get(name).cloned().ok_or_else(|| {
                    HarnessError::MissingCapture {
                        name: name.to_owned(),
                    }
                }),
                None => Ok(Value::String(self.render_str(s)?)),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.render_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut rendered = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    rendered.insert(key.clone(), self.render_value(value)?);
                }
                Ok(Value::Object(rendered))
            }
            other => Ok(other.clone()),
        }
    }
}

/// 문자열 전체가 자리표시자 하나인 경우 그 이름을 반환합니다.
fn whole_placeholder(s: &str) -> Option<&str> {
    let inner = s.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    (!inner.contains(OPEN) && !inner.contains(CLOSE)).then(|| inner.trim())
}
