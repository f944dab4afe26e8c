//! MuseMap Server Library
//!
//! Music theory graph, text-to-audio generation and the HTTP service on top.

pub mod config;
pub mod creations;
pub mod generation;
pub mod graph_store;
pub mod server;
pub mod sqlite_persistence;
pub mod theory;

// Re-export commonly used types for convenience
pub use creations::{CreationStore, SqliteCreationStore};
pub use generation::{AudioBackend, GenerationRequest, Generator, WavFileSink};
pub use graph_store::{GraphStore, SqliteGraphStore};
pub use server::{run_server, RequestsLoggingLevel};
