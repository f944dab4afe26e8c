//! Stand-in for the text-to-audio model server.
//!
//! Answers `/health` and returns a fixed ramp waveform from `/generate`,
//! remembering the last request body so tests can inspect it. A failing
//! instance answers every `/generate` call with a 500.

use super::constants::{MOCK_MODEL_FAILURE, MOCK_MODEL_SAMPLE_RATE};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockState {
    last_request: Arc<Mutex<Option<Value>>>,
    healthy: bool,
    fail_generate: bool,
}

pub struct MockModelServer {
    pub base_url: String,
    last_request: Arc<Mutex<Option<Value>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

async fn health(State(state): State<MockState>) -> StatusCode {
    if state.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn generate(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    *state.last_request.lock().unwrap() = Some(body);
    if state.fail_generate {
        return (StatusCode::INTERNAL_SERVER_ERROR, MOCK_MODEL_FAILURE).into_response();
    }
    Json(json!({
        "sample_rate": MOCK_MODEL_SAMPLE_RATE,
        "samples": [0.0, 0.25, 0.5, -0.5, -0.25],
    }))
    .into_response()
}

impl MockModelServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(true, false).await
    }

    /// A server whose health check fails, so the service picks the fallback.
    #[allow(dead_code)]
    pub async fn spawn_unhealthy() -> Self {
        Self::spawn_with(false, false).await
    }

    /// A healthy server whose generation always fails.
    #[allow(dead_code)]
    pub async fn spawn_failing() -> Self {
        Self::spawn_with(true, true).await
    }

    async fn spawn_with(healthy: bool, fail_generate: bool) -> Self {
        let state = MockState {
            healthy,
            fail_generate,
            ..Default::default()
        };
        let last_request = state.last_request.clone();
        let app = Router::new()
            .route("/health", get(health))
            .route("/generate", post(generate))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock model server");
        let addr = listener.local_addr().expect("Failed to get local address");
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock model server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            last_request,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Body of the most recent `/generate` call.
    #[allow(dead_code)]
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
