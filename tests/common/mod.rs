//! Shared harness: runs the real router on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;

use trendies_rewards::api;
use trendies_rewards::app_state::AppState;
use trendies_rewards::config::RewardsConfig;
use trendies_rewards::notify::RecordingMailer;

/// A running server plus handles for assertions.
#[derive(Debug)]
pub struct TestApp {
    /// Bound address.
    pub addr: SocketAddr,
    /// HTTP client.
    pub client: reqwest::Client,
    /// Mailer wired into every service.
    pub mailer: Arc<RecordingMailer>,
    /// Shared state behind the router.
    pub state: AppState,
}

/// Starts the app with default configuration.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(RewardsConfig::default()).await
}

/// Starts the app with the given configuration.
pub async fn spawn_app_with(config: RewardsConfig) -> TestApp {
    let mailer = Arc::new(RecordingMailer::new());
    let shared: Arc<RecordingMailer> = Arc::clone(&mailer);
    let state = AppState::build(&config, shared);
    let app = api::build_app(state.clone());

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
        mailer,
        state,
    }
}

impl TestApp {
    /// Absolute URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// `GET` returning status and JSON body.
    pub async fn get(&self, path: &str) -> (u16, Value) {
        let Ok(resp) = self.client.get(self.url(path)).send().await else {
            panic!("GET {path} failed");
        };
        read(resp).await
    }

    /// `POST` a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        let Ok(resp) = self.client.post(self.url(path)).json(body).send().await else {
            panic!("POST {path} failed");
        };
        read(resp).await
    }

    /// `PUT` a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> (u16, Value) {
        let Ok(resp) = self.client.put(self.url(path)).json(body).send().await else {
            panic!("PUT {path} failed");
        };
        read(resp).await
    }

    /// Opens an account.
    pub async fn open_account(&self, user_id: &str, email: &str, name: &str) {
        let (status, _) = self
            .post(
                "/api/v1/accounts",
                &serde_json::json!({ "user_id": user_id, "email": email, "name": name }),
            )
            .await;
        assert_eq!(status, 201, "account {user_id} not created");
    }
}

async fn read(resp: reqwest::Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

/// Reads a string at a JSON pointer.
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Reads an integer at a JSON pointer.
pub fn i64_at(value: &Value, pointer: &str) -> Option<i64> {
    value.pointer(pointer).and_then(Value::as_i64)
}
