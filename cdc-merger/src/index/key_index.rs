//! Key index implementation.

use std::collections::HashMap;

/// Position of a row in the merger's slot vector.
pub type RowSlot = usize;

/// Statistics about index operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of insert operations.
    pub insert_count: u64,
    /// Number of delete operations.
    pub delete_count: u64,
    /// Number of lookup operations.
    pub lookup_count: u64,
    /// Number of failed lookups (key not found).
    pub lookup_miss_count: u64,
}

/// In-memory index mapping ids to the slots of the rows carrying them.
///
/// An id maps to more than one slot only when duplicate inserts were appended.
/// Slots are listed in the order they were added.
#[derive(Debug)]
pub struct KeyIndex {
    index: HashMap<String, Vec<RowSlot>>,
    stats: IndexStats,
}

impl KeyIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            stats: IndexStats::default(),
        }
    }

    /// Adds a slot for the given id.
    ///
    /// Returns true if the id was already indexed.
    pub fn insert(&mut self, id: &str, slot: RowSlot) -> bool {
        self.stats.insert_count += 1;
        match self.index.get_mut(id) {
            Some(slots) => {
                slots.push(slot);
                true
            }
            None => {
                self.index.insert(id.to_string(), vec![slot]);
                false
            }
        }
    }

    /// Looks up the slots of an id.
    pub fn get(&mut self, id: &str) -> Option<&[RowSlot]> {
        self.stats.lookup_count += 1;
        let result = self.index.get(id).map(Vec::as_slice);
        if result.is_none() {
            self.stats.lookup_miss_count += 1;
        }
        result
    }

    /// Returns true if the id is indexed, without touching the statistics.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Removes an id, returning all of its slots.
    pub fn remove(&mut self, id: &str) -> Option<Vec<RowSlot>> {
        self.stats.delete_count += 1;
        self.index.remove(id)
    }

    /// Returns the number of distinct ids in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns index statistics.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

impl Default for KeyIndex {
    fn default() -> Self {
        Self::new()
    }
}
