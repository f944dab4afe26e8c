mod models;
mod retention;
mod schema;
mod sqlite_creation_store;

pub use models::Creation;
pub use retention::{prune_older_than, remove_creation_file, spawn_retention_task, PruneSummary};
pub use schema::CREATIONS_VERSIONED_SCHEMAS;
pub use sqlite_creation_store::SqliteCreationStore;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub trait CreationStore: Send + Sync {
    fn add_creation(&self, creation: &Creation) -> Result<()>;
    fn get_creation(&self, id: &str) -> Result<Option<Creation>>;
    /// Newest first.
    fn list_creations(&self, limit: usize, offset: usize) -> Result<Vec<Creation>>;
    /// Returns false if no creation had this id.
    fn delete_creation(&self, id: &str) -> Result<bool>;
    fn list_creations_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Creation>>;
    fn count_creations(&self) -> Result<usize>;
}
