use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Object storage configuration.
///
/// Buckets are directories directly under `root`; object keys are paths
/// relative to their bucket.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Directory holding all buckets.
    pub root: PathBuf,
}

impl StorageConfig {
    /// Validates storage configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.root.as_os_str().is_empty() {
            return Err(ValidationError::empty("storage.root"));
        }

        Ok(())
    }
}

/// Location of the dataset's current snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SnapshotLocationConfig {
    /// Bucket holding the snapshot.
    #[serde(default = "default_snapshot_bucket")]
    pub bucket: String,
    /// Object key of the snapshot inside the bucket.
    #[serde(default = "default_snapshot_key")]
    pub key: String,
}

impl SnapshotLocationConfig {
    /// Default bucket of the snapshot.
    pub const DEFAULT_BUCKET: &'static str = "pyspark-cdc-output-file";

    /// Default object key of the snapshot.
    pub const DEFAULT_KEY: &'static str = "output";

    /// Validates the snapshot location.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bucket.is_empty() {
            return Err(ValidationError::empty("snapshot.bucket"));
        }

        if self.key.is_empty() {
            return Err(ValidationError::empty("snapshot.key"));
        }

        Ok(())
    }
}

impl Default for SnapshotLocationConfig {
    fn default() -> Self {
        Self {
            bucket: default_snapshot_bucket(),
            key: default_snapshot_key(),
        }
    }
}

fn default_snapshot_bucket() -> String {
    SnapshotLocationConfig::DEFAULT_BUCKET.to_string()
}

fn default_snapshot_key() -> String {
    SnapshotLocationConfig::DEFAULT_KEY.to_string()
}
