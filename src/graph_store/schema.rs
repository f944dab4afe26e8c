//! SQLite schema for the theory graph.
//!
//! Nodes carry their label, the value of their key property and a JSON
//! object with all properties. Edges reference node rowids and go away with
//! their endpoints.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const NODES_TABLE: Table = Table {
    name: "nodes",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("label", &SqlType::Text, non_null = true),
        sqlite_column!("key", &SqlType::Text, non_null = true),
        sqlite_column!("properties", &SqlType::Text, non_null = true), // JSON object
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_nodes_label", "label")],
    unique_constraints: &[&["label", "key"]],
};

const NODE_FK: ForeignKey = ForeignKey {
    foreign_table: "nodes",
    foreign_column: "rowid",
    cascade_on_delete: true,
};

const EDGES_TABLE: Table = Table {
    name: "edges",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("label", &SqlType::Text, non_null = true),
        sqlite_column!(
            "from_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&NODE_FK)
        ),
        sqlite_column!(
            "to_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&NODE_FK)
        ),
    ],
    indices: &[("idx_edges_from", "from_rowid")],
    unique_constraints: &[&["label", "from_rowid", "to_rowid"]],
};

pub const GRAPH_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[NODES_TABLE, EDGES_TABLE],
    migration: None,
}];
