//! Music theory lookups and the context service.

use super::metrics::{record_error, record_graph_lookup};
use super::state::{GuardedGraphStore, ServerState};
use crate::graph_store::{EdgeLabel, GraphNode, GraphStoreError, NodeLabel, NodeRef};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

const MAX_COMPLEXITY: u32 = 8;

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn graph_error_response(err: GraphStoreError, endpoint: &str) -> Response {
    match err {
        GraphStoreError::Connectivity(msg) => {
            warn!("Theory graph unavailable: {}", msg);
            record_error("graph_connectivity", endpoint);
            error_body(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Theory graph unavailable: {}", msg),
            )
        }
        other => {
            error!("Theory graph error: {}", other);
            record_error("graph_query", endpoint);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn lookup(
    store: &GuardedGraphStore,
    label: NodeLabel,
    name: &str,
) -> Result<Option<GraphNode>, GraphStoreError> {
    let result = store.lookup_by_name(label, name);
    let outcome = match &result {
        Ok(Some(_)) => "hit",
        Ok(None) => "miss",
        Err(_) => "error",
    };
    record_graph_lookup(label.as_str(), outcome);
    result
}

async fn get_node(
    State(store): State<GuardedGraphStore>,
    Path((label, name)): Path<(String, String)>,
) -> Response {
    let label = match label.parse::<NodeLabel>() {
        Ok(label) => label,
        Err(msg) => return error_body(StatusCode::BAD_REQUEST, msg),
    };
    match lookup(&store, label, &name) {
        Ok(Some(node)) => Json(node).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "not found"),
        Err(err) => graph_error_response(err, "theory"),
    }
}

async fn get_genre_motifs(
    State(store): State<GuardedGraphStore>,
    Path(name): Path<String>,
) -> Response {
    match lookup(&store, NodeLabel::Genre, &name) {
        Ok(Some(_)) => {}
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "not found"),
        Err(err) => return graph_error_response(err, "theory"),
    }
    match store.related(NodeRef::new(NodeLabel::Genre, &name), EdgeLabel::Embraces) {
        Ok(motifs) => Json(motifs).into_response(),
        Err(err) => graph_error_response(err, "theory"),
    }
}

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub seed: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub complexity: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ContextData {
    context: serde_json::Value,
    motifs: Vec<GraphNode>,
    generated_sequence: Vec<String>,
}

/// Arpeggiates the chord `complexity` times, alternating direction.
fn sequence_from_chord(chord: &GraphNode, complexity: u32) -> Vec<String> {
    let notes: Vec<String> = chord
        .properties
        .get("notes")
        .and_then(|n| n.as_array())
        .map(|notes| {
            notes
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    (0..complexity.clamp(1, MAX_COMPLEXITY))
        .flat_map(|pass| {
            let mut pass_notes = notes.clone();
            if pass % 2 == 1 {
                pass_notes.reverse();
            }
            pass_notes
        })
        .collect()
}

async fn post_context_generate(
    State(store): State<GuardedGraphStore>,
    body: Result<Json<ContextRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_body(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    debug!("Context request: {:?}", body);
    let chord = match lookup(&store, NodeLabel::Chord, &body.seed) {
        Ok(Some(chord)) => chord,
        Ok(None) => {
            return error_body(
                StatusCode::NOT_FOUND,
                "Seed not found in the knowledge graph",
            )
        }
        Err(err) => return graph_error_response(err, "context"),
    };

    let motifs = match body.genre.as_deref() {
        Some(genre) => {
            match store.related(NodeRef::new(NodeLabel::Genre, genre), EdgeLabel::Embraces) {
                Ok(motifs) => motifs,
                Err(err) => return graph_error_response(err, "context"),
            }
        }
        None => Vec::new(),
    };

    let data = ContextData {
        generated_sequence: sequence_from_chord(&chord, body.complexity.unwrap_or(1)),
        context: json!({ "node": chord.properties }),
        motifs,
    };
    Json(json!({ "success": true, "data": data })).into_response()
}

pub fn make_theory_routes(state: ServerState) -> Router {
    Router::new()
        .route("/theory/genre/{name}/motifs", get(get_genre_motifs))
        .route("/theory/{label}/{name}", get(get_node))
        .route("/context/generate", post(post_context_generate))
        .with_state(state)
}
