//! Generation endpoints and the creations listing.

use super::metrics::{record_error, record_generation, set_creations_count};
use super::state::{Generators, GuardedCreationStore, ServerState};
use super::ServerConfig;
use crate::creations::{remove_creation_file, Creation};
use crate::generation::{GenerationError, GenerationRequest, Generator};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{error, info, warn};

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub audio_url: String,
    pub duration_seconds: u32,
    pub sample_rate: u32,
    pub generated_at: DateTime<Utc>,
    pub prompt: String,
    pub backend: String,
    pub creation: Creation,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn generation_failure(message: impl std::fmt::Display) -> Response {
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to generate music: {}", message),
    )
}

async fn run_generation(
    generator: &Generator,
    creation_store: &GuardedCreationStore,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return error_body(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let backend = generator.backend().label();
    let start = Instant::now();
    let audio = match generator.generate(&request).await {
        Ok(audio) => audio,
        Err(GenerationError::InvalidRequest(msg)) => {
            return error_body(StatusCode::BAD_REQUEST, msg);
        }
        Err(err) => {
            error!("Generation failed: {}", err);
            record_generation(backend, false, start.elapsed());
            record_error("generation", "generate");
            return generation_failure(err);
        }
    };

    let creation = Creation::from_generation(&request, &audio);
    if let Err(err) = creation_store.add_creation(&creation) {
        error!("Failed to record creation {}: {:#}", creation.id, err);
        record_generation(backend, false, start.elapsed());
        record_error("creation_store", "generate");
        if let Some(dir) = audio.path.parent() {
            remove_creation_file(dir, &creation.file_name());
        }
        return generation_failure(err);
    }
    record_generation(backend, true, start.elapsed());
    if let Ok(count) = creation_store.count_creations() {
        set_creations_count(count);
    }

    info!("Created \"{}\" ({})", creation.title, creation.id);
    let response = GenerationResponse {
        audio_url: audio.audio_url(),
        duration_seconds: audio.duration_seconds,
        sample_rate: audio.sample_rate,
        generated_at: audio.generated_at,
        prompt: audio.prompt,
        backend: audio.backend,
        creation,
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn post_generate(
    State(generators): State<Generators>,
    State(creation_store): State<GuardedCreationStore>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    run_generation(&generators.configured, &creation_store, body).await
}

async fn post_generate_fallback(
    State(generators): State<Generators>,
    State(creation_store): State<GuardedCreationStore>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    run_generation(&generators.fallback, &creation_store, body).await
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn list_creations(
    State(creation_store): State<GuardedCreationStore>,
    Query(page): Query<PageQuery>,
) -> Response {
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = page.offset.unwrap_or(0);
    match creation_store.list_creations(limit, offset) {
        Ok(creations) => Json(creations).into_response(),
        Err(err) => {
            error!("Failed to list creations: {:#}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

async fn get_creation(
    State(creation_store): State<GuardedCreationStore>,
    Path(id): Path<String>,
) -> Response {
    match creation_store.get_creation(&id) {
        Ok(Some(creation)) => Json(creation).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "not found"),
        Err(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn delete_creation(
    State(creation_store): State<GuardedCreationStore>,
    State(config): State<ServerConfig>,
    Path(id): Path<String>,
) -> Response {
    let creation = match creation_store.get_creation(&id) {
        Ok(Some(creation)) => creation,
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "not found"),
        Err(err) => return error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };
    match creation_store.delete_creation(&id) {
        Ok(true) => {
            if !remove_creation_file(&config.audio_dir, &creation.file_name()) {
                warn!("Audio file for creation {} was already gone", id);
            }
            if let Ok(count) = creation_store.count_creations() {
                set_creations_count(count);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_body(StatusCode::NOT_FOUND, "not found"),
        Err(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub fn make_generation_routes(state: ServerState) -> Router {
    Router::new()
        .route("/generate", post(post_generate))
        .route("/generate/fallback", post(post_generate_fallback))
        .route("/creations", get(list_creations))
        .route("/creations/{id}", get(get_creation).delete(delete_creation))
        .with_state(state)
}
