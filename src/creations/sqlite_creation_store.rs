use super::models::Creation;
use super::schema::CREATIONS_VERSIONED_SCHEMAS;
use super::CreationStore;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const SELECT_COLUMNS: &str = "id, title, key, genre, mood, instruments, prompt, duration_seconds, sample_rate, backend, audio_url, created_at";

#[derive(Clone)]
pub struct SqliteCreationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCreationStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open creations database at {:?}", path))?;
        let store = Self::from_connection(conn)?;
        info!("Opened creations database at {:?}", path);
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrate_if_needed(&mut conn, CREATIONS_VERSIONED_SCHEMAS, "creations")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("creations connection poisoned"))
    }

    fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn row_to_creation(row: &rusqlite::Row) -> rusqlite::Result<Creation> {
        let instruments_json: String = row.get("instruments")?;
        let instruments = serde_json::from_str(&instruments_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let duration_seconds: i64 = row.get("duration_seconds")?;
        let sample_rate: i64 = row.get("sample_rate")?;

        Ok(Creation {
            id: row.get("id")?,
            title: row.get("title")?,
            key: row.get("key")?,
            genre: row.get("genre")?,
            mood: row.get("mood")?,
            instruments,
            prompt: row.get("prompt")?,
            duration_seconds: duration_seconds as u32,
            sample_rate: sample_rate as u32,
            backend: row.get("backend")?,
            audio_url: row.get("audio_url")?,
            created_at: Self::millis_to_datetime(row.get("created_at")?),
        })
    }
}

impl CreationStore for SqliteCreationStore {
    fn add_creation(&self, creation: &Creation) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO creations (id, title, key, genre, mood, instruments, prompt, duration_seconds, sample_rate, backend, audio_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                creation.id,
                creation.title,
                creation.key,
                creation.genre,
                creation.mood,
                serde_json::to_string(&creation.instruments)?,
                creation.prompt,
                creation.duration_seconds as i64,
                creation.sample_rate as i64,
                creation.backend,
                creation.audio_url,
                creation.created_at.timestamp_millis(),
            ],
        )
        .with_context(|| format!("Failed to insert creation {}", creation.id))?;
        Ok(())
    }

    fn get_creation(&self, id: &str) -> Result<Option<Creation>> {
        let conn = self.lock()?;
        let creation = conn
            .query_row(
                &format!("SELECT {} FROM creations WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_creation,
            )
            .optional()?;
        Ok(creation)
    }

    fn list_creations(&self, limit: usize, offset: usize) -> Result<Vec<Creation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM creations ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS
        ))?;
        let creations = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_creation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(creations)
    }

    fn delete_creation(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM creations WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn list_creations_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Creation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM creations WHERE created_at < ?1 ORDER BY created_at",
            SELECT_COLUMNS
        ))?;
        let creations = stmt
            .query_map(params![cutoff.timestamp_millis()], Self::row_to_creation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(creations)
    }

    fn count_creations(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM creations", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creations::models::sample_creation as creation;
    use chrono::Duration;
    use tempfile::TempDir;

    fn at_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap()
    }

    #[test]
    fn add_then_get() {
        let store = SqliteCreationStore::in_memory().unwrap();
        let original = creation("a", at_millis(1_700_000_000_123));
        store.add_creation(&original).unwrap();

        let loaded = store.get_creation("a").unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(store.get_creation("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = SqliteCreationStore::in_memory().unwrap();
        store.add_creation(&creation("a", Utc::now())).unwrap();
        assert!(store.add_creation(&creation("a", Utc::now())).is_err());
    }

    #[test]
    fn lists_newest_first() {
        let store = SqliteCreationStore::in_memory().unwrap();
        store.add_creation(&creation("old", at_millis(1_000))).unwrap();
        store.add_creation(&creation("new", at_millis(3_000))).unwrap();
        store.add_creation(&creation("mid", at_millis(2_000))).unwrap();

        let ids: Vec<_> = store
            .list_creations(10, 0)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let page: Vec<_> = store
            .list_creations(1, 1)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(page, vec!["mid"]);
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store = SqliteCreationStore::in_memory().unwrap();
        store.add_creation(&creation("a", Utc::now())).unwrap();
        assert!(store.delete_creation("a").unwrap());
        assert!(!store.delete_creation("a").unwrap());
        assert_eq!(store.count_creations().unwrap(), 0);
    }

    #[test]
    fn finds_creations_older_than_cutoff() {
        let store = SqliteCreationStore::in_memory().unwrap();
        let now = Utc::now();
        store
            .add_creation(&creation("stale", now - Duration::days(10)))
            .unwrap();
        store.add_creation(&creation("fresh", now)).unwrap();

        let old = store
            .list_creations_older_than(now - Duration::days(7))
            .unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].id, "stale");
    }

    #[test]
    fn persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creations.db");
        SqliteCreationStore::new(&path)
            .unwrap()
            .add_creation(&creation("kept", Utc::now()))
            .unwrap();

        let store = SqliteCreationStore::new(&path).unwrap();
        assert!(store.get_creation("kept").unwrap().is_some());
    }
}
