//! Error types for the cdc-job crate.

use std::path::PathBuf;

use cdc_config::LoadConfigError;
use cdc_config::shared::ValidationError;
use cdc_merger::MergerError;
use cdc_telemetry::tracing::TracingError;
use thiserror::Error;

use crate::location::StorageLocation;

/// Errors that abort a job run.
///
/// A failed run never replaces the snapshot.
#[derive(Error, Debug)]
pub enum JobError {
    /// Error from the merge engine or the CSV codec.
    #[error("Merge error: {0}")]
    Merger(#[from] MergerError),

    /// Filesystem error while accessing an object.
    #[error("IO error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A storage URI or object key that cannot be used.
    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),

    /// The input object does not exist.
    #[error("Input object not found: {0}")]
    InputMissing(StorageLocation),

    /// An update batch arrived before any initial load produced a snapshot.
    #[error("No snapshot at {0}; an initial load must run before update batches")]
    SnapshotMissing(StorageLocation),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    LoadConfig(#[from] LoadConfigError),

    /// Configuration was loaded but is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    /// Logging could not be initialized.
    #[error("Tracing error: {0}")]
    Tracing(#[from] TracingError),
}

impl JobError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;
