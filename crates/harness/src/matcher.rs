//! 결과 매처 -- 관측 결과와 기대 결과 비교
//!
//! 판정 순서: 전송 상태 -> 업무 코드 -> 메시지 -> 본문 검사.
//! 관측 데이터가 비정상이어도 패닉하지 않으며, 불일치는 모두 [`Mismatch`]로 수집합니다.
//!
//! # 관용 규칙
//!
//! - 상태/코드는 집합 소속으로 판정 (백엔드가 여러 값을 섞어 쓰는 경우를 허용)
//! - 메시지는 후보 문구 중 하나라도 포함되면 통과
//! - 스칼라 비교는 `"42"`와 `42`를 같은 값으로 취급 (ID 타입 차이 흡수)

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use savecheck_core::types::{
    BodyCheck, CodeExpectation, ExpectedOutcome, Outcome, scalar_string,
};

/// 본문 발췌 최대 길이 (문자 수)
const BODY_EXCERPT_CHARS: usize = 300;

/// 단일 불일치 항목
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// 전송 상태가 허용 집합에 없음
    Status { expected: BTreeSet<u16>, actual: u16 },
    /// 업무 코드가 요구되었으나 없음
    CodeMissing { expected: BTreeSet<i64> },
    /// 업무 코드가 허용 집합에 없음
    CodeNotAllowed { expected: BTreeSet<i64>, actual: i64 },
    /// 업무 코드가 금지 집합에 있음
    CodeForbidden { forbidden: BTreeSet<i64>, actual: i64 },
    /// 메시지 판정이 요구되었으나 메시지가 없음
    MessageMissing { predicate: String },
    /// 메시지 판정 실패
    Message { predicate: String, actual: String },
    /// 본문 검사 실패
    Body { check: String, reason: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { expected, actual } => {
                write!(f, "transport status {actual} not in {expected:?}")
            }
            Self::CodeMissing { expected } => {
                write!(f, "business code missing, expected one of {expected:?}")
            }
            Self::CodeNotAllowed { expected, actual } => {
                write!(f, "business code {actual} not in {expected:?}")
            }
            Self::CodeForbidden { forbidden, actual } => {
                write!(f, "business code {actual} must not be in {forbidden:?}")
            }
            Self::MessageMissing { predicate } => {
                write!(f, "message missing, expected it to {predicate}")
            }
            Self::Message { predicate, actual } => {
                write!(f, "message {actual:?} does not {predicate}")
            }
            Self::Body { check, reason } => write!(f, "body check `{check}` failed: {reason}"),
        }
    }
}

/// 관측 결과가 기대 결과에 부합하는지 확인합니다.
pub fn matches(observed: &Outcome, expected: &ExpectedOutcome) -> bool {
    explain(observed, expected).is_empty()
}

/// 모든 불일치 항목을 수집합니다. 빈 목록이면 통과입니다.
pub fn explain(observed: &Outcome, expected: &ExpectedOutcome) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    if !expected.status_set.contains(&observed.transport_status) {
        mismatches.push(Mismatch::Status {
            expected: expected.status_set.clone(),
            actual: observed.transport_status,
        });
    }

    match (&expected.code, observed.business_code) {
        (CodeExpectation::Any, _) => {}
        (CodeExpectation::OneOf(allowed), None) => {
            mismatches.push(Mismatch::CodeMissing {
                expected: allowed.clone(),
            });
        }
        (CodeExpectation::OneOf(allowed), Some(code)) if !allowed.contains(&code) => {
            mismatches.push(Mismatch::CodeNotAllowed {
                expected: allowed.clone(),
                actual: code,
            });
        }
        (CodeExpectation::NoneOf(forbidden), Some(code)) if forbidden.contains(&code) => {
            mismatches.push(Mismatch::CodeForbidden {
                forbidden: forbidden.clone(),
                actual: code,
            });
        }
        _ => {}
    }

    if let Some(predicate) = &expected.message {
        match observed.message.as_deref() {
            None => mismatches.push(Mismatch::MessageMissing {
                predicate: predicate.to_string(),
            }),
            Some(message) if !predicate.test(message) => mismatches.push(Mismatch::Message {
                predicate: predicate.to_string(),
                actual: message.to_owned(),
            }),
            Some(_) => {}
        }
    }

    for check in &expected.body {
        if let Err(reason) = evaluate(check, &observed.body) {
            mismatches.push(Mismatch::Body {
                check: check.to_string(),
                reason,
            });
        }
    }

    mismatches
}

/// 실패 리포트용 사람이 읽을 수 있는 설명을 만듭니다.
pub fn describe(observed: &Outcome, mismatches: &[Mismatch]) -> String {
    let mut lines: Vec<String> = mismatches.iter().map(|m| format!("- {m}")).collect();
    lines.push(format!(
        "observed: status={} code={:?} message={:?} body={}",
        observed.transport_status,
        observed.business_code,
        observed.message,
        excerpt(&observed.body)
    ));
    lines.join("\n")
}

fn excerpt(body: &Value) -> String {
    let rendered = match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() <= BODY_EXCERPT_CHARS {
        rendered
    } else {
        let cut: String = rendered.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}

fn evaluate(check: &BodyCheck, body: &Value) -> Result<(), String> {
    match check {
        BodyCheck::Present(path) => path
            .resolve(body)
            .map(|_| ())
            .ok_or_else(|| "field not found".to_owned()),

        BodyCheck::NonEmpty(path) => match path.resolve(body) {
            None => Err("field not found".to_owned()),
            Some(value) if is_empty(value) => Err(format!("field is empty: {value}")),
            Some(_) => Ok(()),
        },

        BodyCheck::Equals(path, expected) => match path.resolve(body) {
            None => Err("field not found".to_owned()),
            Some(actual) if loosely_equal(actual, expected) => Ok(()),
            Some(actual) => Err(format!("found {actual}")),
        },

        BodyCheck::IsArray(path) => match path.resolve(body) {
            None => Err("field not found".to_owned()),
            Some(Value::Array(_)) => Ok(()),
            Some(other) => Err(format!("found non-array {other}")),
        },

        BodyCheck::AtLeast(path, min) => match path.resolve(body) {
            None => Err("field not found".to_owned()),
            Some(value) => match as_integer(value) {
                Some(n) if n >= *min => Ok(()),
                Some(n) => Err(format!("found {n}")),
                None => Err(format!("found non-numeric {value}")),
            },
        },

        BodyCheck::ArrayContains {
            array,
            field,
            value,
        } => match array.resolve(body) {
            None => Err("array not found".to_owned()),
            Some(Value::Array(items)) => {
                let found = items
                    .iter()
                    .filter_map(|item| item.get(field))
                    .any(|candidate| loosely_equal(candidate, value));
                if found {
                    Ok(())
                } else {
                    Err(format!("no element among {} matched", items.len()))
                }
            }
            Some(other) => Err(format!("found non-array {other}")),
        },
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (scalar_string(actual), scalar_string(expected)) {
        (Some(a), Some(e)) => a == e,
        _ => false,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
