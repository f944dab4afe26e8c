mod models;
mod populate;
mod schema;
mod store;
mod trait_def;

pub use models::{EdgeLabel, GraphNode, NodeLabel, NodeRef, Properties};
pub use populate::{populate, PopulateSummary};
pub use store::SqliteGraphStore;
pub use trait_def::{GraphResult, GraphStore, GraphStoreError};
