//! CDC Job - Runs the initial load builder or the merge engine for one input object.
//!
//! A job run receives the bucket and key of a newly arrived object. Keys that
//! contain the configured load marker are full extracts and replace the
//! snapshot; any other key is a change batch that is merged into the current
//! snapshot. Snapshots are replaced atomically, so a failed run leaves the
//! previous snapshot in place.

mod error;
mod job;
mod location;
pub mod storage;

pub use error::{JobError, JobResult};
pub use job::{BatchKind, JobArgs, JobReport, JobRunner, run_job};
pub use location::StorageLocation;
pub use storage::{LocalObjectStore, MemoryObjectStore, ObjectStore};
