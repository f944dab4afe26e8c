//! Shared constants for end-to-end tests
//!
//! When the populated theory catalog or request defaults change,
//! update only this file.

#![allow(dead_code)]

// ============================================================================
// Theory Graph Data
// ============================================================================

/// A chord present in the populated graph
pub const SEED_CHORD: &str = "A Minor";

/// Notes of SEED_CHORD in order
pub const SEED_CHORD_NOTES: [&str; 3] = ["A", "C", "E"];

/// A scale present in the populated graph
pub const SCALE_NAME: &str = "C Major";

/// A genre that embraces exactly one motif
pub const GENRE_NAME: &str = "Jazz";

/// The motif embraced by GENRE_NAME
pub const GENRE_MOTIF: &str = "syncopated";

/// Node counts after populating the full catalog
pub const SCALE_COUNT: usize = 24;
pub const CHORD_COUNT: usize = 96;
pub const GENRE_COUNT: usize = 8;
pub const MOTIF_COUNT: usize = 8;

// ============================================================================
// Generation
// ============================================================================

/// Sample rate of the fallback synthesizer
pub const FALLBACK_SAMPLE_RATE: u32 = 32000;

/// Upper bound on clip length applied by the server
pub const MAX_DURATION_SEC: u32 = 30;

/// Sample rate reported by the mock model server
pub const MOCK_MODEL_SAMPLE_RATE: u32 = 16000;

/// Error body of a failing mock model server
pub const MOCK_MODEL_FAILURE: &str = "CUDA out of memory";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
