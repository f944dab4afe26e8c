//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases and audio directory.

use super::constants::*;
use musemap_server::creations::{CreationStore, SqliteCreationStore};
use musemap_server::generation::{
    AudioBackend, Generator, HttpTextToAudio, TextToAudio, WavFileSink,
};
use musemap_server::graph_store::{populate, GraphStore, SqliteGraphStore};
use musemap_server::server::{
    server::make_app, Generators, RequestsLoggingLevel, ServerConfig, ServerState,
};
use musemap_server::theory::build_catalog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated databases and audio directory
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    /// Directory the server writes WAV files to
    #[allow(dead_code)]
    pub audio_dir: PathBuf,

    /// Creation store for direct database access in tests
    #[allow(dead_code)]
    pub creation_store: Arc<dyn CreationStore>,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port using the fallback synthesizer
    pub async fn spawn() -> Self {
        Self::spawn_with_model(None).await
    }

    /// Spawns a new test server, optionally backed by a model server at `model_url`
    ///
    /// This function:
    /// 1. Creates a temporary directory for databases and audio
    /// 2. Populates the theory graph from the built-in catalog
    /// 3. Selects the audio backend (health-checking the model if given)
    /// 4. Binds to a random port (127.0.0.1:0)
    /// 5. Spawns the server in a background task
    /// 6. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if store creation, port binding or startup fails.
    pub async fn spawn_with_model(model_url: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let audio_dir = temp_dir.path().join("generated_audio");
        std::fs::create_dir_all(&audio_dir).expect("Failed to create audio dir");

        let graph_store = SqliteGraphStore::new(temp_dir.path().join("graph.db"))
            .expect("Failed to open graph store");
        populate(&graph_store, &build_catalog()).expect("Failed to populate graph");
        let graph_store: Arc<dyn GraphStore> = Arc::new(graph_store);

        let creation_store: Arc<dyn CreationStore> = Arc::new(
            SqliteCreationStore::new(temp_dir.path().join("creations.db"))
                .expect("Failed to open creation store"),
        );

        let model = model_url.map(|url| {
            Arc::new(
                HttpTextToAudio::new(url, "test-model", REQUEST_TIMEOUT_SECS)
                    .expect("Failed to build model client"),
            ) as Arc<dyn TextToAudio>
        });
        let backend = AudioBackend::select(model).await;

        let sink = Arc::new(WavFileSink::new(&audio_dir));
        let generators = Generators {
            configured: Generator::new(backend, sink.clone())
                .with_limits(MAX_DURATION_SEC, FALLBACK_SAMPLE_RATE),
            fallback: Generator::fallback_only(sink)
                .with_limits(MAX_DURATION_SEC, FALLBACK_SAMPLE_RATE),
        };

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            audio_dir: audio_dir.clone(),
            ..Default::default()
        };
        let state = ServerState::new(
            config,
            graph_store,
            creation_store.clone(),
            generators,
            "test",
        );
        let app = make_app(state);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            audio_dir,
            creation_store,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
