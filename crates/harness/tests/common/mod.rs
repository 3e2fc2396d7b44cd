//! Shared helpers for harness integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use serde_json::{Value, json};

use savecheck_harness::ContractClient;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> ContractClient {
    ContractClient::new(base_url, Duration::from_secs(2)).expect("build client")
}

/// Scripted register/login endpoints that count registrations.
pub struct AuthStub {
    pub register_code: i64,
    pub login_token: Option<&'static str>,
    pub registrations: AtomicUsize,
    pub logins: AtomicUsize,
}

impl AuthStub {
    pub fn new(register_code: i64, login_token: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            register_code,
            login_token,
            registrations: AtomicUsize::new(0),
            logins: AtomicUsize::new(0),
        })
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/api/user/register", post(register))
            .route("/api/user/login", post(login))
            .with_state(Arc::clone(self))
    }
}

async fn register(State(stub): State<Arc<AuthStub>>, Json(body): Json<Value>) -> Json<Value> {
    stub.registrations.fetch_add(1, Ordering::SeqCst);
    // widen the window in which concurrent first callers could race
    tokio::time::sleep(Duration::from_millis(50)).await;
    let message = match stub.register_code {
        200 => "注册成功",
        1001 => "用户名已存在",
        _ => "服务器内部错误",
    };
    Json(json!({
        "code": stub.register_code,
        "message": message,
        "user_id": "17",
        "username": body["username"],
    }))
}

async fn login(State(stub): State<Arc<AuthStub>>) -> (StatusCode, Json<Value>) {
    stub.logins.fetch_add(1, Ordering::SeqCst);
    match stub.login_token {
        Some(token) => (
            StatusCode::OK,
            Json(json!({"code": 200, "message": "登录成功", "token": token, "user_id": "17"})),
        ),
        None => (
            StatusCode::OK,
            Json(json!({"code": 200, "message": "登录成功"})),
        ),
    }
}
