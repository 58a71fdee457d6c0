//! CDC Merger - Reconciles a base snapshot with a batch of change records.
//!
//! This crate provides the two core components of the CDC pipeline:
//!
//! - the initial load builder, which turns a headerless first-load extract into
//!   the first [`Snapshot`] of a dataset, and
//! - the [`Merger`], which applies an ordered batch of insert, update and delete
//!   [`ChangeRecord`]s to a snapshot and returns the new snapshot.
//!
//! # Architecture
//!
//! The merger keeps an in-memory index from business key to row slots, so each
//! change is applied without scanning the snapshot. Merging is pure: reading
//! and writing snapshots and batches happens at the edges through the
//! [`codec`] functions.
//!
//! # Action tags
//!
//! Change batches tag each row with `I`, `U` or `D`. Parsing is lenient on
//! top of that: the words `INSERT`, `UPDATE` and `DELETE` are accepted in any
//! case, and whitespace around a tag is ignored. Any other tag, including a
//! lowercase letter, is kept as [`ChangeAction::Unknown`] and skipped by the
//! merger.
//!
//! # Usage
//!
//! ```rust
//! use cdc_merger::{ChangeRecord, Merger, MergerConfig, Record, load_initial_snapshot};
//!
//! let base = load_initial_snapshot("1,Alice,NYC\n2,Bob,LA\n".as_bytes()).unwrap();
//!
//! let merger = Merger::new(MergerConfig::default());
//! let outcome = merger.merge(
//!     base,
//!     vec![
//!         ChangeRecord::insert("3", "Carol", "SF"),
//!         ChangeRecord::update("1", "Alicia", "NYC"),
//!         ChangeRecord::delete("2"),
//!     ],
//! );
//!
//! assert_eq!(
//!     outcome.snapshot.sorted_by_id(),
//!     vec![Record::new("1", "Alicia", "NYC"), Record::new("3", "Carol", "SF")]
//! );
//! ```

mod change;
pub mod codec;
mod config;
mod error;
pub mod index;
mod loader;
mod merger;
mod record;

pub use change::{
    ChangeAction, ChangeBatch, ChangeRecord, DELETE_TAG, INSERT_TAG, UPDATE_TAG,
};
pub use config::{DuplicateKeyPolicy, MergerConfig};
pub use error::{MergerError, MergerResult};
pub use index::{IndexStats, KeyIndex, RowSlot};
pub use loader::load_initial_snapshot;
pub use merger::{MergeOutcome, MergeSummary, Merger};
pub use record::{
    CITY_COLUMN_NAME, FULL_NAME_COLUMN_NAME, ID_COLUMN_NAME, Record, SNAPSHOT_COLUMNS, Snapshot,
};
