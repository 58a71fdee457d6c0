use serde::{Deserialize, Serialize};

use crate::load::Config;
use crate::shared::{MergeConfig, SnapshotLocationConfig, StorageConfig, ValidationError};

/// Configuration of the merge job.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub snapshot: SnapshotLocationConfig,
    #[serde(default)]
    pub merge: MergeConfig,
}

impl JobConfig {
    /// Validates the job configuration and all of its sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.snapshot.validate()?;
        self.merge.validate()
    }
}

impl Config for JobConfig {
    const NAME: &'static str = "job configuration";
}
