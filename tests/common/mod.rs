//! Common test utilities for sortline integration tests.
//!
//! Provides `TestEnv` for isolated settings directories and `FakeBackend`, an
//! in-process stand-in for the sorting-line server (HTTP endpoints plus the
//! `/ws` live channel) built on axum.

#![allow(dead_code)]

use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
pub use tempfile::TempDir;

/// A test environment with an isolated settings directory.
///
/// `sortline()` returns a command whose environment cannot see the user's
/// real settings file or `SORTLINE_*` variables.
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the sortline binary with isolated settings.
    pub fn sortline(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sortline"));
        cmd.current_dir(self.home.path());
        cmd.env("HOME", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("XDG_DATA_HOME", self.home.path().join(".local/share"));
        for var in [
            "SORTLINE_HOST",
            "SORTLINE_PORT",
            "SORTLINE_USERNAME",
            "SORTLINE_PASSWORD",
            "SORTLINE_CONFIG",
            "SORTLINE_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a settings file and return its path.
    pub fn write_settings(&self, contents: &str) -> PathBuf {
        let path = self.home.path().join("settings.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write an arbitrary file under the environment root.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Fake backend
// ============================================================================

/// Everything the fake backend was asked to do.
#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub control_messages: Vec<Value>,
    pub config_updates: Vec<Value>,
    pub mock_requests: Vec<Value>,
    pub maintenance_resets: usize,
    pub queue_resets: usize,
    pub ws_connections: usize,
    pub authorization: Vec<Option<String>>,
}

/// Canned responses.
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Sent as a `state_update` frame to every new socket
    pub snapshot: Value,
    pub config: Value,
    pub sort_log: Value,
    /// When set, HTTP endpoints answer 401 unless this exact header is sent
    pub required_authorization: Option<String>,
    /// When set, `/update_config` fails with this `error` message
    pub reject_config: Option<String>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            snapshot: sample_state(),
            config: sample_config(),
            sort_log: json!({
                "2026-10-18": {"Lane A": 3, "Lane B": 1},
                "2026-10-19": {"Lane A": 5}
            }),
            required_authorization: None,
            reject_config: None,
        }
    }
}

pub fn sample_state() -> Value {
    json!({
        "lanes": [
            {"id": "SP001", "name": "Lane A", "sensor_pin": 5, "push_pin": 11, "pull_pin": 12,
             "sensor_reading": 1, "relay_grab": 0, "relay_push": 0, "count": 4, "status": "Sẵn sàng"},
            {"id": "SP002", "name": "Lane B", "sensor_pin": 6, "push_pin": 13,
             "sensor_reading": 0, "relay_grab": 0, "relay_push": 1, "count": 2, "status": "Đang đẩy"},
            {"id": "PASS", "name": "Pass", "count": 1, "status": "Sẵn sàng"}
        ],
        "is_mock": true,
        "maintenance_mode": false,
        "queue_indices": [1, 0],
        "timing_config": {"use_sensor_entry_gantry": false},
        "gpio_mode": "mock"
    })
}

pub fn sample_config() -> Value {
    json!({
        "lanes_config": [
            {"id": "SP001", "name": "Lane A", "sensor_pin": 5, "push_pin": 11, "pull_pin": 12},
            {"id": "SP002", "name": "Lane B", "sensor_pin": 6, "push_pin": 13},
            {"id": "PASS", "name": "Pass"}
        ],
        "timing_config": {"cycle_delay": 0.1, "use_sensor_entry_gantry": false}
    })
}

#[derive(Clone)]
struct Shared {
    behavior: Arc<Behavior>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Shared {
    fn record<F: FnOnce(&mut Recorded)>(&self, f: F) {
        f(&mut self.recorded.lock().unwrap());
    }

    /// Record the Authorization header and check it against the behavior.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let sent = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.record(|r| r.authorization.push(sent.clone()));
        match &self.behavior.required_authorization {
            Some(required) if sent.as_deref() != Some(required.as_str()) => {
                Err(StatusCode::UNAUTHORIZED.into_response())
            }
            _ => Ok(()),
        }
    }
}

/// Handle to a running fake backend.
pub struct FakeBackend {
    pub port: u16,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeBackend {
    pub fn start() -> Self {
        Self::with_behavior(Behavior::default())
    }

    /// Serve on an ephemeral port from a dedicated runtime thread, so the
    /// backend works for both plain and `#[tokio::test]` tests.
    pub fn with_behavior(behavior: Behavior) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let shared = Shared {
            behavior: Arc::new(behavior),
            recorded: Arc::clone(&recorded),
        };
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap().port()).unwrap();
                axum::serve(listener, router(shared)).await.unwrap();
            });
        });

        let port = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        Self { port, recorded }
    }

    pub fn http_base(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded.lock().unwrap().clone()
    }

    /// Poll until `pred` holds for the recorded calls, or panic after 5s.
    pub fn wait_for<F: Fn(&Recorded) -> bool>(&self, pred: F) -> Recorded {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let snapshot = self.recorded();
            if pred(&snapshot) {
                return snapshot;
            }
            assert!(Instant::now() < deadline, "timed out waiting: {:?}", snapshot);
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    /// Settings file pointing the CLI at this backend.
    pub fn settings_toml(&self) -> String {
        format!(
            "host = \"127.0.0.1\"\nport = {}\nreconnect-delay-ms = 200\nrequest-timeout-secs = 5\n",
            self.port
        )
    }
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/config", get(get_config))
        .route("/update_config", post(update_config))
        .route("/api/reset_maintenance", post(reset_maintenance))
        .route("/api/mock_gpio", post(mock_gpio))
        .route("/api/queue/reset", post(reset_queue))
        .route("/api/sort_log", get(sort_log))
        .with_state(shared)
}

async fn ws_handler(ws: WebSocketUpgrade, State(shared): State<Shared>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, shared))
}

async fn handle_socket(mut socket: WebSocket, shared: Shared) {
    shared.record(|r| r.ws_connections += 1);
    let frame = json!({"type": "state_update", "state": shared.behavior.snapshot}).to_string();
    if socket.send(Message::Text(frame)).await.is_err() {
        return;
    }
    let hello = json!({"type": "log", "log_type": "success", "message": "Client connected"});
    let _ = socket.send(Message::Text(hello.to_string())).await;

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                if let Ok(value) = serde_json::from_str::<Value>(&text) {
                    shared.record(|r| r.control_messages.push(value));
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn get_config(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    Json(shared.behavior.config.clone()).into_response()
}

async fn update_config(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    if let Some(reason) = &shared.behavior.reject_config {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": reason}))).into_response();
    }
    shared.record(|r| r.config_updates.push(payload));
    Json(json!({"message": "Cấu hình đã được cập nhật.", "restart_required": true})).into_response()
}

async fn reset_maintenance(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    shared.record(|r| r.maintenance_resets += 1);
    Json(json!({"message": "Đã thoát chế độ bảo trì."})).into_response()
}

async fn mock_gpio(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    let lane_index = payload["lane_index"].as_u64().unwrap_or(0) as usize;
    let state = payload["state"].clone();
    shared.record(|r| r.mock_requests.push(payload));
    let lane = &shared.behavior.config["lanes_config"][lane_index];
    Json(json!({"lane": lane["name"], "pin": lane["sensor_pin"], "state": state})).into_response()
}

async fn reset_queue(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    shared.record(|r| r.queue_resets += 1);
    Json(json!({})).into_response()
}

async fn sort_log(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = shared.authorize(&headers) {
        return denied;
    }
    Json(shared.behavior.sort_log.clone()).into_response()
}
