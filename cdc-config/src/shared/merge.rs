use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// What an insert does when its id is already present in the snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Append another record with the same id.
    #[default]
    Append,
    /// Overwrite the existing record's fields.
    Upsert,
}

/// Merge behavior configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MergeConfig {
    #[serde(default)]
    pub duplicate_key_policy: DuplicateKeyPolicy,
    /// Substring of an input key that marks it as an initial load.
    #[serde(default = "default_load_marker")]
    pub load_marker: String,
}

impl MergeConfig {
    /// Default marker of initial load files.
    pub const DEFAULT_LOAD_MARKER: &'static str = "LOAD";

    /// Validates merge configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.load_marker.is_empty() {
            return Err(ValidationError::empty("merge.load_marker"));
        }

        Ok(())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            duplicate_key_policy: DuplicateKeyPolicy::default(),
            load_marker: default_load_marker(),
        }
    }
}

fn default_load_marker() -> String {
    MergeConfig::DEFAULT_LOAD_MARKER.to_string()
}
