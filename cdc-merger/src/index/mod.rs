//! In-memory index from business key to row slots.
//!
//! The merger keeps every row in a slot vector and uses this index to find the
//! slots holding a given id, so UPDATE and DELETE operations never scan the
//! whole snapshot.

mod key_index;

pub use key_index::{IndexStats, KeyIndex, RowSlot};
