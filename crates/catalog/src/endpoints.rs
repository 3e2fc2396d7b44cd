//! Endpoint table of the target service.
//!
//! Every authenticated endpoint listed here gets a generated
//! "no bearer header" scenario in [`crate::unauthorized`].

use reqwest::Method;
use serde_json::{Value, json};

use savecheck_harness::CallTemplate;

pub const PING: &str = "/ping";

pub const USER_REGISTER: &str = "/api/user/register";
pub const USER_LOGIN: &str = "/api/user/login";
pub const USER_INFO: &str = "/api/user/info";
pub const USER_UPDATE: &str = "/api/user/update";
pub const USER_CHANGE_PASSWORD: &str = "/api/user/change_password";
pub const USER_DELETE: &str = "/api/user/delete";

pub const SAVE_CREATE: &str = "/api/save/create";
pub const SAVE_GET: &str = "/api/save/get";
pub const SAVE_UPDATE: &str = "/api/save/update";
pub const SAVE_DELETE: &str = "/api/save/delete";
pub const SAVE_LIST: &str = "/api/save/list";

/// One HTTP operation exposed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Short name used in scenario names (e.g. `user-info`).
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    /// Whether the endpoint requires a bearer token.
    pub authenticated: bool,
}

impl Endpoint {
    const fn new(name: &'static str, method: Method, path: &'static str, authenticated: bool) -> Self {
        Self {
            name,
            method,
            path,
            authenticated,
        }
    }

    /// Anonymous call carrying a plausible payload, so that a rejection
    /// can only come from the missing credentials.
    pub fn plausible_call(&self) -> CallTemplate {
        let call = CallTemplate::new(self.method.clone(), self.path).anonymous();
        match self.path {
            SAVE_GET => call.query("save_id", "1"),
            SAVE_LIST => call.query("page", "1").query("page_size", "10"),
            _ => match plausible_body(self.path) {
                Some(body) => call.json(body),
                None => call,
            },
        }
    }
}

fn plausible_body(path: &str) -> Option<Value> {
    let body = match path {
        USER_REGISTER | USER_LOGIN => json!({"username": "testuser", "password": "testpass"}),
        USER_UPDATE => json!({"nickname": "未授权"}),
        USER_CHANGE_PASSWORD => json!({"old_password": "any", "new_password": "any"}),
        SAVE_CREATE => json!({"save_name": "未授权存档", "save_data": "内容"}),
        SAVE_UPDATE => json!({"save_id": "xxx", "save_name": "xxx", "save_data": "xxx", "save_type": "novel"}),
        SAVE_DELETE => json!({"save_id": "xxx"}),
        _ => return None,
    };
    Some(body)
}

/// All endpoints of the service.
pub static ENDPOINTS: [Endpoint; 11] = [
    Endpoint::new("user-register", Method::POST, USER_REGISTER, false),
    Endpoint::new("user-login", Method::POST, USER_LOGIN, false),
    Endpoint::new("user-info", Method::GET, USER_INFO, true),
    Endpoint::new("user-update", Method::PUT, USER_UPDATE, true),
    Endpoint::new("user-change-password", Method::POST, USER_CHANGE_PASSWORD, true),
    Endpoint::new("user-delete", Method::DELETE, USER_DELETE, true),
    Endpoint::new("save-create", Method::POST, SAVE_CREATE, true),
    Endpoint::new("save-get", Method::GET, SAVE_GET, true),
    Endpoint::new("save-update", Method::PUT, SAVE_UPDATE, true),
    Endpoint::new("save-delete", Method::DELETE, SAVE_DELETE, true),
    Endpoint::new("save-list", Method::GET, SAVE_LIST, true),
];

/// Endpoints that require a bearer token.
pub fn authenticated() -> impl Iterator<Item = &'static Endpoint> {
    ENDPOINTS.iter().filter(|e| e.authenticated)
}
