use axum::extract::FromRef;

use crate::creations::CreationStore;
use crate::generation::Generator;
use crate::graph_store::GraphStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedGraphStore = Arc<dyn GraphStore>;
pub type GuardedCreationStore = Arc<dyn CreationStore>;

/// Generators for the two generation routes.
#[derive(Clone)]
pub struct Generators {
    /// Uses the backend selected at startup.
    pub configured: Generator,
    /// Never consults the model.
    pub fallback: Generator,
}

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub graph_store: GuardedGraphStore,
    pub creation_store: GuardedCreationStore,
    pub generators: Generators,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        graph_store: GuardedGraphStore,
        creation_store: GuardedCreationStore,
        generators: Generators,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            graph_store,
            creation_store,
            generators,
            hash: hash.into(),
        }
    }
}

impl FromRef<ServerState> for GuardedGraphStore {
    fn from_ref(input: &ServerState) -> Self {
        input.graph_store.clone()
    }
}

impl FromRef<ServerState> for GuardedCreationStore {
    fn from_ref(input: &ServerState) -> Self {
        input.creation_store.clone()
    }
}

impl FromRef<ServerState> for Generators {
    fn from_ref(input: &ServerState) -> Self {
        input.generators.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
