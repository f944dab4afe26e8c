use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;

use super::generation_routes::make_generation_routes;
use super::metrics::metrics_handler;
use super::state::ServerState;
use super::theory_routes::make_theory_routes;
use super::log_requests;
use crate::generation::AUDIO_URL_PREFIX;

#[derive(Serialize)]
struct ServerStats {
    pub message: &'static str,
    pub uptime: String,
    pub hash: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
    model: Option<String>,
    model_loaded: bool,
    using_fallback: bool,
    generated_audio_dir: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        message: "MuseMap music generation service is running",
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    let backend = state.generators.configured.backend();
    Json(HealthResponse {
        status: "running",
        backend: backend.label(),
        model: backend.model_name().map(str::to_string),
        model_loaded: !backend.is_fallback(),
        using_fallback: backend.is_fallback(),
        generated_audio_dir: state.config.audio_dir.to_string_lossy().to_string(),
    })
}

pub fn make_app(state: ServerState) -> Router {
    let v1_routes = make_theory_routes(state.clone()).merge(make_generation_routes(state.clone()));

    let audio_files = ServeDir::new(&state.config.audio_dir);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/v1", v1_routes)
        .nest_service(AUDIO_URL_PREFIX, audio_files)
        .layer(middleware::from_fn_with_state(
            state.config.requests_logging_level.clone(),
            log_requests,
        ))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::try_join!(
        async { axum::serve(listener, app).await.context("HTTP server failed") },
        async {
            axum::serve(metrics_listener, make_metrics_app())
                .await
                .context("Metrics server failed")
        },
    )?;
    Ok(())
}
