//! User account scenarios.
//!
//! Scenarios that invalidate credentials (delete, password change) run on a
//! disposable account. The lifecycle scenario registers its own user and
//! authenticates with the token captured from its own login.

use serde_json::json;

use savecheck_core::codes;
use savecheck_core::types::{BodyCheck, ExpectedOutcome, FieldPath, MessagePredicate, ResourceKind};
use savecheck_harness::runner::captures::{SESSION_PASSWORD, SESSION_USERNAME};
use savecheck_harness::{Auth, CallTemplate, Scenario, SessionRequirement, Step};

use crate::endpoints::{
    USER_CHANGE_PASSWORD, USER_DELETE, USER_INFO, USER_LOGIN, USER_REGISTER, USER_UPDATE,
};
use crate::lifecycle::{self, ResourceSpec};

const MSG_REGISTERED: &str = "注册成功";
const MSG_FETCHED: &str = "获取成功";
const MSG_UPDATED: &str = "更新成功";

/// Literal token the service can never have issued.
pub const INVALID_TOKEN: &str = "invalidtoken123";

const UNKNOWN_USER: &str = "not_exist_user_abc";

fn session_username() -> String {
    format!("{{{{{SESSION_USERNAME}}}}}")
}

fn session_password() -> String {
    format!("{{{{{SESSION_PASSWORD}}}}}")
}

fn token_path() -> FieldPath {
    FieldPath::any(["/token", "/data/token"])
}

fn user_id_path() -> FieldPath {
    FieldPath::any(["/user_id", "/data/user_id"])
}

fn profile(field: &str) -> FieldPath {
    FieldPath::enveloped(&["user", "data"], field)
}

fn login_call(username: &str, password: &str) -> CallTemplate {
    CallTemplate::post(USER_LOGIN)
        .anonymous()
        .json(json!({"username": username, "password": password}))
}

/// Failed login: never a success code, message names the failure in either
/// language.
fn rejected_login(needles: &[&str]) -> ExpectedOutcome {
    ExpectedOutcome::status([codes::STATUS_OK, codes::STATUS_UNAUTHORIZED])
        .not_codes(codes::SUCCESS_CODES)
        .message(MessagePredicate::contains_any_ignore_case(needles.iter().copied()))
}

/// Validation failure: 400 or 200 on the wire, 400 or 500 in the body.
fn validation_failure() -> ExpectedOutcome {
    ExpectedOutcome::status([codes::STATUS_BAD_REQUEST, codes::STATUS_OK])
        .codes([codes::BAD_REQUEST, codes::INTERNAL_ERROR])
}

fn invalid_token(name: &str, call: CallTemplate) -> Scenario {
    Scenario::new(name)
        .session(SessionRequirement::None)
        .step(Step::new(
            "call with invalid token",
            call.auth(Auth::Token(INVALID_TOKEN.to_owned())),
            ExpectedOutcome::unauthorized(),
        ))
}

/// Every user scenario, in execution order.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        register_success(),
        register_duplicate(),
        register_missing_password(),
        login_success(),
        login_wrong_password(),
        login_unknown_user(),
        login_missing_password(),
        info_success(),
        invalid_token("user/info/invalid-token", CallTemplate::get(USER_INFO)),
        update_success(),
        update_missing_params(),
        invalid_token(
            "user/update/invalid-token",
            CallTemplate::put(USER_UPDATE).json(json!({"nickname": "无效token"})),
        ),
        change_password_success(),
        change_password_wrong_old(),
        change_password_missing_params(),
        invalid_token(
            "user/change-password/invalid-token",
            CallTemplate::post(USER_CHANGE_PASSWORD)
                .json(json!({"old_password": "any", "new_password": "any"})),
        ),
        delete_success(),
        delete_twice(),
        invalid_token("user/delete/invalid-token", CallTemplate::delete(USER_DELETE)),
        lifecycle(),
    ]
}

fn register_success() -> Scenario {
    Scenario::new("user/register/success")
        .session(SessionRequirement::None)
        .step(
            Step::new(
                "register fresh user",
                CallTemplate::post(USER_REGISTER)
                    .anonymous()
                    .json(json!({"username": "testuser_{{unique}}", "password": "testpass"})),
                ExpectedOutcome::success()
                    .message_eq(MSG_REGISTERED)
                    .check(BodyCheck::Present(user_id_path())),
            )
            .capture_resource("user_id", user_id_path(), ResourceKind::User),
        )
}

/// Runs after the shared fixture registered its identity, so the second
/// registration is guaranteed to collide.
fn register_duplicate() -> Scenario {
    Scenario::new("user/register/duplicate").step(Step::new(
        "register fixture user again",
        CallTemplate::post(USER_REGISTER)
            .anonymous()
            .json(json!({"username": session_username(), "password": session_password()})),
        ExpectedOutcome::status([codes::STATUS_OK])
            .codes([codes::USER_EXISTS])
            .message_contains_any(codes::ALREADY_EXISTS_MESSAGES),
    ))
}

fn register_missing_password() -> Scenario {
    Scenario::new("user/register/missing-password")
        .session(SessionRequirement::None)
        .step(Step::new(
            "register without password",
            CallTemplate::post(USER_REGISTER)
                .anonymous()
                .json(json!({"username": "abc"})),
            validation_failure(),
        ))
}

fn login_success() -> Scenario {
    Scenario::new("user/login/success").step(Step::new(
        "login fixture user",
        login_call(&session_username(), &session_password()),
        ExpectedOutcome::success()
            .check(BodyCheck::NonEmpty(token_path()))
            .check(BodyCheck::Present(user_id_path())),
    ))
}

fn login_wrong_password() -> Scenario {
    Scenario::new("user/login/wrong-password").step(Step::new(
        "login with wrong password",
        login_call(&session_username(), "wrongpass"),
        rejected_login(&["错误", "失败", "incorrect", "not exist", "error"]),
    ))
}

fn login_unknown_user() -> Scenario {
    Scenario::new("user/login/unknown-user")
        .session(SessionRequirement::None)
        .step(Step::new(
            "login unknown user",
            login_call(UNKNOWN_USER, "any"),
            rejected_login(&["不存在", "失败", "incorrect", "not exist", "error"]),
        ))
}

fn login_missing_password() -> Scenario {
    Scenario::new("user/login/missing-password").step(Step::new(
        "login without password",
        CallTemplate::post(USER_LOGIN)
            .anonymous()
            .json(json!({"username": session_username()})),
        ExpectedOutcome::status([
            codes::STATUS_BAD_REQUEST,
            codes::STATUS_UNAUTHORIZED,
            codes::STATUS_OK,
        ])
        .codes([codes::BAD_REQUEST, codes::UNAUTHORIZED, codes::INTERNAL_ERROR]),
    ))
}

fn info_success() -> Scenario {
    Scenario::new("user/info/success").step(Step::new(
        "get own profile",
        CallTemplate::get(USER_INFO),
        ExpectedOutcome::success()
            .message_eq(MSG_FETCHED)
            .check(BodyCheck::Equals(profile("username"), json!(session_username()))),
    ))
}

fn update_success() -> Scenario {
    Scenario::new("user/update/success")
        .step(Step::new(
            "update nickname",
            CallTemplate::put(USER_UPDATE).json(json!({"nickname": "新昵称test"})),
            ExpectedOutcome::success().message_eq(MSG_UPDATED),
        ))
        .step(Step::new(
            "read updated profile",
            CallTemplate::get(USER_INFO),
            ExpectedOutcome::success()
                .check(BodyCheck::Equals(profile("nickname"), json!("新昵称test"))),
        ))
}

fn update_missing_params() -> Scenario {
    Scenario::new("user/update/missing-params").step(Step::new(
        "update with empty body",
        CallTemplate::put(USER_UPDATE).json(json!({})),
        validation_failure(),
    ))
}

fn change_password_success() -> Scenario {
    Scenario::new("user/change-password/success")
        .session(SessionRequirement::Disposable)
        .step(Step::new(
            "change password",
            CallTemplate::post(USER_CHANGE_PASSWORD).json(json!({
                "old_password": session_password(),
                "new_password": "newpass_{{unique}}",
            })),
            ExpectedOutcome::success().message_contains_any(["成功"]),
        ))
        .step(Step::new(
            "login with new password",
            login_call(&session_username(), "newpass_{{unique}}"),
            ExpectedOutcome::success().check(BodyCheck::NonEmpty(token_path())),
        ))
}

fn change_password_wrong_old() -> Scenario {
    Scenario::new("user/change-password/wrong-old").step(Step::new(
        "change password with wrong old password",
        CallTemplate::post(USER_CHANGE_PASSWORD).json(json!({
            "old_password": "wrongpass",
            "new_password": session_password(),
        })),
        ExpectedOutcome::status([codes::STATUS_OK])
            .not_codes(codes::SUCCESS_CODES)
            .message_contains_any(["错误", "失败"]),
    ))
}

/// Disposable: a lenient backend could accept the request and change the
/// password.
fn change_password_missing_params() -> Scenario {
    Scenario::new("user/change-password/missing-params")
        .session(SessionRequirement::Disposable)
        .step(Step::new(
            "change password without new password",
            CallTemplate::post(USER_CHANGE_PASSWORD)
                .json(json!({"old_password": session_password()})),
            validation_failure(),
        ))
}

fn delete_success() -> Scenario {
    Scenario::new("user/delete/success")
        .session(SessionRequirement::Disposable)
        .step(Step::new(
            "delete own account",
            CallTemplate::delete(USER_DELETE),
            ExpectedOutcome::success().message_contains_any(["删除成功"]),
        ))
}

/// The token of a deleted account may be rejected on the wire or answered with
/// an error code; either way it must not succeed and the message must say the
/// account is gone or the delete failed.
fn delete_twice() -> Scenario {
    Scenario::new("user/delete/twice")
        .session(SessionRequirement::Disposable)
        .step(Step::new(
            "delete own account",
            CallTemplate::delete(USER_DELETE),
            ExpectedOutcome::success(),
        ))
        .step(Step::new(
            "delete own account again",
            CallTemplate::delete(USER_DELETE),
            ExpectedOutcome::status(
                std::iter::once(codes::STATUS_OK).chain(codes::AUTH_FAILURE_STATUSES),
            )
            .not_codes(codes::SUCCESS_CODES)
            .message_contains_any(["不存在", "已删除", "失败"]),
        ))
}

/// Resource description used by the full user lifecycle.
pub fn resource_spec() -> ResourceSpec {
    let username = "lifecycle_{{unique}}";
    let password = "testpass";

    ResourceSpec {
        kind: ResourceKind::User,
        id_capture: "user_id".to_owned(),
        id_path: user_id_path(),
        create: CallTemplate::post(USER_REGISTER).anonymous().json(json!({
            "username": username,
            "password": password,
            "nickname": "初始昵称",
        })),
        create_message: Some(MessagePredicate::Equals(MSG_REGISTERED.to_owned())),
        after_create: vec![
            Step::new(
                "login user",
                login_call(username, password),
                ExpectedOutcome::success().check(BodyCheck::NonEmpty(token_path())),
            )
            .capture("token", token_path()),
        ],
        auth: Auth::Captured("token".to_owned()),
        read: CallTemplate::get(USER_INFO),
        envelopes: vec!["user", "data"],
        echo: vec![
            ("username", json!(username)),
            ("nickname", json!("初始昵称")),
        ],
        update: CallTemplate::put(USER_UPDATE).json(json!({"nickname": "已更新昵称"})),
        update_message: Some(MessagePredicate::Equals(MSG_UPDATED.to_owned())),
        updated: vec![("nickname", json!("已更新昵称"))],
        list: None,
        delete: CallTemplate::delete(USER_DELETE),
        delete_message: Some(MessagePredicate::contains_any(["删除成功"])),
        gone: ExpectedOutcome::status(
            [codes::STATUS_OK, codes::STATUS_BAD_REQUEST, codes::STATUS_NOT_FOUND]
                .into_iter()
                .chain(codes::AUTH_FAILURE_STATUSES),
        )
        .not_codes(codes::SUCCESS_CODES),
    }
}

fn lifecycle() -> Scenario {
    Scenario::new("user/lifecycle")
        .session(SessionRequirement::None)
        .steps(lifecycle::standard(&resource_spec()))
}
