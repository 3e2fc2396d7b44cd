//! In-memory implementation of the target service.
//!
//! Serves the user and save endpoints with the same transport statuses,
//! business codes and messages as the real backend, so the full catalog
//! can run end to end without one.
//!
//! [`Shape::Legacy`] answers with success code `0`, capitalized
//! `Code`/`Message` keys and every payload under `data`. [`Violations`]
//! breaks individual parts of the contract on purpose.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post, put};
use serde_json::{Map, Value, json};

const MSG_BAD_PARAMS: &str = "请求参数不合法";
const MSG_MISSING_PARAMS: &str = "缺少必需参数";
const MSG_BAD_PAGINATION: &str = "分页参数非法";
const MSG_UNAUTHORIZED: &str = "未授权，请先登录";
const MSG_SAVE_NOT_FOUND: &str = "保存项不存在";

const SAVE_FIELDS: [&str; 4] = ["save_name", "save_data", "save_type", "save_description"];

/// Response conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `code` 200, `user`/`save` envelopes.
    Current,
    /// `Code` 0, everything under `data`.
    Legacy,
}

/// Deliberate contract breaches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Violations {
    /// Deleting a missing save reports success.
    pub repeat_delete_succeeds: bool,
    /// Save deletes report success but keep the record.
    pub ignore_deletes: bool,
    /// Login of an existing user succeeds with any password.
    pub accept_any_password: bool,
    /// Listings leave out the newest save and count one less.
    pub list_drops_newest: bool,
}

#[derive(Debug, Clone)]
pub struct MockOptions {
    pub shape: Shape,
    /// Pings answered with 503 before the service reports ready.
    pub ready_after: usize,
    /// Delay applied to every API request.
    pub latency: Duration,
    /// Make every registration fail with an internal error.
    pub broken_registration: bool,
    pub violations: Violations,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            shape: Shape::Current,
            ready_after: 0,
            latency: Duration::ZERO,
            broken_registration: false,
            violations: Violations::default(),
        }
    }
}

impl MockOptions {
    pub fn legacy() -> Self {
        Self {
            shape: Shape::Legacy,
            ..Self::default()
        }
    }

    pub fn violating(violations: Violations) -> Self {
        Self {
            violations,
            ..Self::default()
        }
    }
}

struct Account {
    user_id: u64,
    password: String,
    nickname: String,
    email: String,
}

struct SaveRecord {
    owner: String,
    fields: Map<String, Value>,
}

#[derive(Default)]
struct Store {
    users: HashMap<String, Account>,
    /// token -> username
    tokens: HashMap<String, String>,
    saves: BTreeMap<u64, SaveRecord>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, username: &str) -> String {
        let token = format!("tok{}{}", self.next_id(), username.len());
        self.tokens.insert(token.clone(), username.to_owned());
        token
    }

    fn owned_save(&mut self, id: &Value, owner: &str) -> Option<(u64, &mut SaveRecord)> {
        let id = parse_id(id)?;
        self.saves
            .get_mut(&id)
            .filter(|record| record.owner == owner)
            .map(|record| (id, record))
    }
}

type Reply = (StatusCode, Json<Value>);

/// Running mock service with request counters.
pub struct MockService {
    options: MockOptions,
    store: Mutex<Store>,
    pings: AtomicUsize,
    registrations: AtomicUsize,
    logins: AtomicUsize,
}

impl MockService {
    /// Serves a fresh mock on an ephemeral local port.
    ///
    /// Returns the base URL and a handle for inspecting state.
    pub async fn spawn(options: MockOptions) -> (String, Arc<Self>) {
        let service = Arc::new(Self {
            options,
            store: Mutex::new(Store::default()),
            pings: AtomicUsize::new(0),
            registrations: AtomicUsize::new(0),
            logins: AtomicUsize::new(0),
        });
        let app = service.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock service");
        });
        (format!("http://{addr}"), service)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn has_user(&self, username: &str) -> bool {
        self.store().users.contains_key(username)
    }

    pub fn user_count(&self) -> usize {
        self.store().users.len()
    }

    pub fn save_count(&self) -> usize {
        self.store().saves.len()
    }

    fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .route("/api/user/register", post(register))
            .route("/api/user/login", post(login))
            .route("/api/user/info", get(user_info))
            .route("/api/user/update", put(user_update))
            .route("/api/user/change_password", post(change_password))
            .route("/api/user/delete", delete(user_delete))
            .route("/api/save/create", post(save_create))
            .route("/api/save/get", get(save_get))
            .route("/api/save/update", put(save_update))
            .route("/api/save/delete", delete(save_delete))
            .route("/api/save/list", get(save_list))
            .with_state(Arc::clone(self))
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if !self.options.latency.is_zero() {
            tokio::time::sleep(self.options.latency).await;
        }
    }

    fn reply(&self, status: StatusCode, code: i64, message: &str, payload: Option<Value>) -> Reply {
        let (code_key, message_key) = match self.options.shape {
            Shape::Current => ("code", "message"),
            Shape::Legacy => ("Code", "Message"),
        };
        let mut body = Map::new();
        body.insert(code_key.to_owned(), json!(code));
        body.insert(message_key.to_owned(), json!(message));
        if let Some(Value::Object(extra)) = payload {
            body.extend(extra);
        }
        (status, Json(Value::Object(body)))
    }

    fn success(&self, message: &str, payload: Option<Value>) -> Reply {
        let code = match self.options.shape {
            Shape::Current => 200,
            Shape::Legacy => 0,
        };
        self.reply(StatusCode::OK, code, message, payload)
    }

    fn failure(&self, status: StatusCode, code: i64, message: &str) -> Reply {
        self.reply(status, code, message, None)
    }

    fn bad_request(&self, message: &str) -> Reply {
        self.failure(StatusCode::BAD_REQUEST, 400, message)
    }

    fn save_not_found(&self) -> Reply {
        self.failure(StatusCode::NOT_FOUND, 404, MSG_SAVE_NOT_FOUND)
    }

    /// Wraps a record under its own key, or under `data` for legacy.
    fn enveloped(&self, key: &str, record: Value) -> Value {
        match self.options.shape {
            Shape::Current => json!({ key: record }),
            Shape::Legacy => json!({ "data": record }),
        }
    }

    /// Top-level fields, or nested under `data` for legacy.
    fn fields(&self, fields: Value) -> Value {
        match self.options.shape {
            Shape::Current => fields,
            Shape::Legacy => json!({ "data": fields }),
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<String, Reply> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        token
            .and_then(|token| self.store().tokens.get(token).cloned())
            .ok_or_else(|| self.failure(StatusCode::UNAUTHORIZED, 401, MSG_UNAUTHORIZED))
    }
}

fn parse_body(raw: &Bytes) -> Value {
    serde_json::from_slice(raw).unwrap_or_else(|_| json!({}))
}

fn text(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// `save_id` as sent by the client, number or string.
fn save_id(body: &Value) -> Option<Value> {
    match body.get("save_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(id) => Some(id.clone()),
    }
}

fn parse_id(id: &Value) -> Option<u64> {
    match id {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn record_json(id: u64, record: &SaveRecord) -> Value {
    let mut fields = record.fields.clone();
    fields.insert("save_id".to_owned(), json!(id));
    Value::Object(fields)
}

async fn ping(State(svc): State<Arc<MockService>>) -> (StatusCode, &'static str) {
    let seen = svc.pings.fetch_add(1, Ordering::SeqCst) + 1;
    if seen > svc.options.ready_after {
        (StatusCode::OK, "pong")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "starting")
    }
}

async fn register(State(svc): State<Arc<MockService>>, raw: Bytes) -> Reply {
    svc.pause().await;
    svc.registrations.fetch_add(1, Ordering::SeqCst);
    if svc.options.broken_registration {
        return svc.failure(StatusCode::INTERNAL_SERVER_ERROR, 500, "服务器内部错误");
    }

    let body = parse_body(&raw);
    let (Some(username), Some(password)) = (text(&body, "username"), text(&body, "password"))
    else {
        return svc.bad_request(MSG_BAD_PARAMS);
    };

    let mut store = svc.store();
    if store.users.contains_key(&username) {
        return svc.failure(StatusCode::OK, 1001, "用户名已存在");
    }
    let user_id = store.next_id();
    store.users.insert(
        username.clone(),
        Account {
            user_id,
            password,
            nickname: text(&body, "nickname").unwrap_or_default(),
            email: text(&body, "email").unwrap_or_default(),
        },
    );
    let token = store.issue_token(&username);
    drop(store);

    svc.success(
        "注册成功",
        Some(svc.fields(json!({"user_id": user_id, "username": username, "token": token}))),
    )
}

async fn login(State(svc): State<Arc<MockService>>, raw: Bytes) -> Reply {
    svc.pause().await;
    svc.logins.fetch_add(1, Ordering::SeqCst);

    let body = parse_body(&raw);
    let (Some(username), Some(password)) = (text(&body, "username"), text(&body, "password"))
    else {
        return svc.bad_request(MSG_BAD_PARAMS);
    };

    let mut store = svc.store();
    let user_id = match store.users.get(&username) {
        None => return svc.failure(StatusCode::OK, 1002, "用户不存在"),
        Some(account)
            if account.password != password && !svc.options.violations.accept_any_password =>
        {
            return svc.failure(StatusCode::OK, 1002, "密码验证失败");
        }
        Some(account) => account.user_id,
    };
    let token = store.issue_token(&username);
    drop(store);

    svc.success(
        "登录成功",
        Some(svc.fields(json!({"token": token, "user_id": user_id, "username": username}))),
    )
}

async fn user_info(State(svc): State<Arc<MockService>>, headers: HeaderMap) -> Reply {
    svc.pause().await;
    let username = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let profile = svc.store().users.get(&username).map(|account| {
        json!({
            "user_id": account.user_id,
            "username": username,
            "nickname": account.nickname,
            "email": account.email,
        })
    });
    match profile {
        Some(profile) => svc.success("获取成功", Some(svc.enveloped("user", profile))),
        None => svc.failure(StatusCode::NOT_FOUND, 404, "用户不存在"),
    }
}

async fn user_update(State(svc): State<Arc<MockService>>, headers: HeaderMap, raw: Bytes) -> Reply {
    svc.pause().await;
    let username = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let body = parse_body(&raw);
    let nickname = text(&body, "nickname");
    if nickname.is_none() && text(&body, "avatar").is_none() {
        return svc.bad_request(MSG_BAD_PARAMS);
    }

    if let Some(nickname) = nickname {
        if let Some(account) = svc.store().users.get_mut(&username) {
            account.nickname = nickname;
        }
    }
    svc.success("更新成功", None)
}

async fn change_password(
    State(svc): State<Arc<MockService>>,
    headers: HeaderMap,
    raw: Bytes,
) -> Reply {
    svc.pause().await;
    let username = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let body = parse_body(&raw);
    let (Some(old), Some(new)) = (text(&body, "old_password"), text(&body, "new_password")) else {
        return svc.bad_request(MSG_BAD_PARAMS);
    };

    let mut store = svc.store();
    match store.users.get_mut(&username) {
        Some(account) if account.password == old => account.password = new,
        _ => return svc.failure(StatusCode::OK, 1002, "旧密码错误"),
    }
    drop(store);
    svc.success("密码修改成功", None)
}

async fn user_delete(State(svc): State<Arc<MockService>>, headers: HeaderMap) -> Reply {
    svc.pause().await;
    let username = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    // Tokens outlive the account, so a repeated delete reaches this point.
    let mut store = svc.store();
    if store.users.remove(&username).is_none() {
        return svc.failure(StatusCode::OK, 1002, "用户不存在");
    }
    store.saves.retain(|_, record| record.owner != username);
    drop(store);
    svc.success("删除成功", None)
}

/// Accepts a create without content, like the real backend.
async fn save_create(State(svc): State<Arc<MockService>>, headers: HeaderMap, raw: Bytes) -> Reply {
    svc.pause().await;
    let owner = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let body = parse_body(&raw);
    let name = text(&body, "save_name").or_else(|| text(&body, "title"));
    let data = text(&body, "save_data").or_else(|| text(&body, "content"));

    let mut fields = Map::new();
    fields.insert("save_name".to_owned(), json!(name.unwrap_or_default()));
    fields.insert("save_data".to_owned(), json!(data.unwrap_or_default()));
    for key in ["save_type", "save_description"] {
        fields.insert(key.to_owned(), json!(text(&body, key).unwrap_or_default()));
    }

    let mut store = svc.store();
    let save_id = store.next_id();
    store.saves.insert(save_id, SaveRecord { owner, fields });
    drop(store);

    svc.success("创建成功", Some(svc.fields(json!({"save_id": save_id}))))
}

async fn save_get(
    State(svc): State<Arc<MockService>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    svc.pause().await;
    let owner = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let Some(id) = params.get("save_id").filter(|id| !id.is_empty()) else {
        return svc.bad_request(MSG_MISSING_PARAMS);
    };

    let record = svc
        .store()
        .owned_save(&json!(id), &owner)
        .map(|(id, record)| record_json(id, record));
    match record {
        Some(record) => svc.success("获取成功", Some(svc.enveloped("save", record))),
        None => svc.save_not_found(),
    }
}

/// Partial update: only the fields present in the body change.
async fn save_update(State(svc): State<Arc<MockService>>, headers: HeaderMap, raw: Bytes) -> Reply {
    svc.pause().await;
    let owner = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let body = parse_body(&raw);
    let Some(id) = save_id(&body) else {
        return svc.bad_request(MSG_MISSING_PARAMS);
    };

    let mut store = svc.store();
    let Some((_, record)) = store.owned_save(&id, &owner) else {
        return svc.save_not_found();
    };
    for key in SAVE_FIELDS {
        if let Some(value) = body.get(key).filter(|v| v.is_string()) {
            record.fields.insert(key.to_owned(), value.clone());
        }
    }
    drop(store);
    svc.success("更新成功", None)
}

async fn save_delete(State(svc): State<Arc<MockService>>, headers: HeaderMap, raw: Bytes) -> Reply {
    svc.pause().await;
    let owner = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let body = parse_body(&raw);
    let Some(id) = save_id(&body) else {
        return svc.bad_request(MSG_MISSING_PARAMS);
    };

    let violations = svc.options.violations;
    let mut store = svc.store();
    let Some((id, _)) = store.owned_save(&id, &owner) else {
        if violations.repeat_delete_succeeds {
            return svc.success("删除成功", None);
        }
        return svc.save_not_found();
    };
    if !violations.ignore_deletes {
        store.saves.remove(&id);
    }
    drop(store);
    svc.success("删除成功", None)
}

async fn save_list(
    State(svc): State<Arc<MockService>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    svc.pause().await;
    let owner = match svc.authenticate(&headers) {
        Ok(username) => username,
        Err(reply) => return reply,
    };

    let positive = |key: &str| {
        params
            .get(key)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
    };
    let (Some(page), Some(page_size)) = (positive("page"), positive("page_size")) else {
        return svc.bad_request(MSG_BAD_PAGINATION);
    };

    let store = svc.store();
    let mut owned: Vec<Value> = store
        .saves
        .iter()
        .filter(|(_, record)| record.owner == owner)
        .map(|(id, record)| record_json(*id, record))
        .collect();
    drop(store);
    if svc.options.violations.list_drops_newest {
        owned.pop();
    }

    let total = owned.len();
    let saves: Vec<Value> = owned
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    svc.success(
        "获取成功",
        Some(svc.fields(json!({
            "saves": saves,
            "total": total,
            "page": page,
            "page_size": page_size,
        }))),
    )
}
