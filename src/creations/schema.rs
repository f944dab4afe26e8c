use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const CREATIONS_TABLE: Table = Table {
    name: "creations",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("key", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("mood", &SqlType::Text, non_null = true),
        sqlite_column!("instruments", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("prompt", &SqlType::Text, non_null = true),
        sqlite_column!("duration_seconds", &SqlType::Integer, non_null = true),
        sqlite_column!("sample_rate", &SqlType::Integer, non_null = true),
        sqlite_column!("backend", &SqlType::Text, non_null = true),
        sqlite_column!("audio_url", &SqlType::Text, non_null = true),
        // Unix milliseconds
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_creations_created_at", "created_at")],
    unique_constraints: &[],
};

pub const CREATIONS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[CREATIONS_TABLE],
    migration: None,
}];
