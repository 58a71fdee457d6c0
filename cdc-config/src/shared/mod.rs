//! Shared configuration types for the CDC job and trigger.

mod base;
mod job;
mod merge;
mod storage;
mod trigger;

pub use base::ValidationError;
pub use job::JobConfig;
pub use merge::{DuplicateKeyPolicy, MergeConfig};
pub use storage::{SnapshotLocationConfig, StorageConfig};
pub use trigger::{ApplicationConfig, LauncherConfig, TriggerConfig};
