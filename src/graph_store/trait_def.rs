//! GraphStore trait definition.
//!
//! The theory graph is a small property graph: labelled nodes identified by a
//! key property, and labelled directed edges between them.

use super::models::{EdgeLabel, GraphNode, NodeLabel, NodeRef, Properties};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphStoreError {
    /// The backing store could not be opened or reached.
    #[error("Graph store unavailable: {0}")]
    Connectivity(String),

    #[error("Graph query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Invalid node properties: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for GraphStoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure,
            ) => GraphStoreError::Connectivity(err.to_string()),
            _ => GraphStoreError::Query(err),
        }
    }
}

pub type GraphResult<T> = Result<T, GraphStoreError>;

/// Storage backend for the theory graph.
///
/// Writes merge by key: upserting an existing node overwrites the given
/// properties and leaves the others untouched, and edges are never
/// duplicated. Lookup misses are `Ok(None)`, never errors.
pub trait GraphStore: Send + Sync {
    /// Upserts a batch of nodes sharing the same label. Each entry is the key
    /// value and the properties to set. Returns how many nodes were newly
    /// created.
    fn upsert_nodes(
        &self,
        label: NodeLabel,
        nodes: Vec<(String, Properties)>,
    ) -> GraphResult<usize>;

    /// Upserts a single node.
    fn upsert_node(
        &self,
        label: NodeLabel,
        key: &str,
        properties: Properties,
    ) -> GraphResult<bool> {
        Ok(self.upsert_nodes(label, vec![(key.to_string(), properties)])? == 1)
    }

    /// Creates the edge if both endpoints exist and the edge does not.
    /// Returns false when either endpoint is missing.
    fn upsert_edge(
        &self,
        label: EdgeLabel,
        from: NodeRef<'_>,
        to: NodeRef<'_>,
    ) -> GraphResult<bool>;

    /// Finds the node of `label` whose key property equals `name`. If the
    /// data ever holds duplicates, the first inserted one wins.
    fn lookup_by_name(&self, label: NodeLabel, name: &str) -> GraphResult<Option<GraphNode>>;

    /// Nodes reachable from `from` through one outgoing `edge` hop.
    fn related(&self, from: NodeRef<'_>, edge: EdgeLabel) -> GraphResult<Vec<GraphNode>>;

    /// Number of nodes, optionally restricted to one label.
    fn count_nodes(&self, label: Option<NodeLabel>) -> GraphResult<usize>;

    fn count_edges(&self) -> GraphResult<usize>;
}
