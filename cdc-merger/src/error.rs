//! Error types for the cdc-merger crate.

use thiserror::Error;

/// Errors that can occur while loading, decoding or merging snapshots.
///
/// Only conditions that must abort a whole run are represented here. Per-record
/// anomalies inside a change batch (unknown actions, rows without an id) are
/// absorbed by the decoder and the merger and reported through their summaries.
#[derive(Error, Debug)]
pub enum MergerError {
    /// Error from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A row of an initial load extract has too few fields.
    #[error("Malformed row at line {line}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A snapshot file does not carry the canonical header.
    #[error("Invalid snapshot header: expected `{expected}`, found `{found}`")]
    InvalidHeader { expected: String, found: String },
}

/// Result type for merger operations.
pub type MergerResult<T> = Result<T, MergerError>;
