//! SQLite-backed theory graph.

use super::models::{EdgeLabel, GraphNode, NodeLabel, NodeRef, Properties};
use super::schema::GRAPH_VERSIONED_SCHEMAS;
use super::trait_def::{GraphResult, GraphStore, GraphStoreError};
use crate::sqlite_persistence::migrate_if_needed;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteGraphStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGraphStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> GraphResult<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            GraphStoreError::Connectivity(format!("Failed to open graph db {:?}: {}", db_path, e))
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self::from_connection(conn)?;
        info!(
            "Opened theory graph at {:?}: {} nodes, {} edges",
            db_path,
            store.count_nodes(None)?,
            store.count_edges()?
        );
        Ok(store)
    }

    pub fn in_memory() -> GraphResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> GraphResult<Self> {
        migrate_if_needed(&mut conn, GRAPH_VERSIONED_SCHEMAS, "graph").map_err(|e| {
            GraphStoreError::Connectivity(format!("Failed to initialize graph schema: {:#}", e))
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> GraphResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GraphStoreError::Connectivity("graph connection poisoned".to_string()))
    }

    fn node_rowid(conn: &Connection, node: NodeRef<'_>) -> GraphResult<Option<i64>> {
        Ok(conn
            .query_row(
                "SELECT rowid FROM nodes WHERE label = ?1 AND key = ?2 ORDER BY rowid LIMIT 1",
                params![node.label.as_str(), node.key],
                |r| r.get(0),
            )
            .optional()?)
    }
}

fn parse_properties(raw: &str) -> GraphResult<Properties> {
    Ok(serde_json::from_str(raw)?)
}

impl GraphStore for SqliteGraphStore {
    fn upsert_nodes(
        &self,
        label: NodeLabel,
        nodes: Vec<(String, Properties)>,
    ) -> GraphResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = 0;

        for (key, mut properties) in nodes {
            properties.insert(label.key_property().to_string(), key.clone().into());

            let existing: Option<(i64, String)> = tx
                .query_row(
                    "SELECT rowid, properties FROM nodes WHERE label = ?1 AND key = ?2",
                    params![label.as_str(), key],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?;

            match existing {
                Some((rowid, raw)) => {
                    let mut merged = parse_properties(&raw)?;
                    merged.extend(properties);
                    tx.execute(
                        "UPDATE nodes SET properties = ?1 WHERE rowid = ?2",
                        params![serde_json::to_string(&merged)?, rowid],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO nodes (label, key, properties) VALUES (?1, ?2, ?3)",
                        params![label.as_str(), key, serde_json::to_string(&properties)?],
                    )?;
                    created += 1;
                }
            }
        }

        tx.commit()?;
        debug!("Upserted {} nodes, {} new", label, created);
        Ok(created)
    }

    fn upsert_edge(
        &self,
        label: EdgeLabel,
        from: NodeRef<'_>,
        to: NodeRef<'_>,
    ) -> GraphResult<bool> {
        let conn = self.lock()?;
        let (Some(from_rowid), Some(to_rowid)) =
            (Self::node_rowid(&conn, from)?, Self::node_rowid(&conn, to)?)
        else {
            debug!(
                "Skipping {} edge {}:{} -> {}:{}, endpoint missing",
                label.as_str(),
                from.label,
                from.key,
                to.label,
                to.key
            );
            return Ok(false);
        };
        conn.execute(
            "INSERT OR IGNORE INTO edges (label, from_rowid, to_rowid) VALUES (?1, ?2, ?3)",
            params![label.as_str(), from_rowid, to_rowid],
        )?;
        Ok(true)
    }

    fn lookup_by_name(&self, label: NodeLabel, name: &str) -> GraphResult<Option<GraphNode>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT properties FROM nodes WHERE label = ?1 AND key = ?2 ORDER BY rowid LIMIT 1",
                params![label.as_str(), name],
                |r| r.get(0),
            )
            .optional()?;
        raw.map(|raw| {
            Ok(GraphNode {
                label,
                properties: parse_properties(&raw)?,
            })
        })
        .transpose()
    }

    fn related(&self, from: NodeRef<'_>, edge: EdgeLabel) -> GraphResult<Vec<GraphNode>> {
        let conn = self.lock()?;
        let Some(from_rowid) = Self::node_rowid(&conn, from)? else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(
            "SELECT n.label, n.properties FROM edges e
             JOIN nodes n ON n.rowid = e.to_rowid
             WHERE e.from_rowid = ?1 AND e.label = ?2
             ORDER BY e.rowid",
        )?;
        let rows: Vec<(String, String)> = stmt
            .query_map(params![from_rowid, edge.as_str()], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<Result<_, _>>()?;

        rows.into_iter()
            .filter_map(|(label, raw)| label.parse::<NodeLabel>().ok().map(|label| (label, raw)))
            .map(|(label, raw)| {
                Ok(GraphNode {
                    label,
                    properties: parse_properties(&raw)?,
                })
            })
            .collect()
    }

    fn count_nodes(&self, label: Option<NodeLabel>) -> GraphResult<usize> {
        let conn = self.lock()?;
        let count: i64 = match label {
            Some(label) => conn.query_row(
                "SELECT COUNT(*) FROM nodes WHERE label = ?1",
                params![label.as_str()],
                |r| r.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM nodes", [], |r| r.get(0))?,
        };
        Ok(count as usize)
    }

    fn count_edges(&self) -> GraphResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
