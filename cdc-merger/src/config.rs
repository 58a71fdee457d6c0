//! Configuration for the merge engine.

/// What an insert does when a record with the same id is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Appends a second record sharing the id.
    ///
    /// Later updates rewrite every record with that id and deletes remove all of
    /// them, so the duplicates move in lockstep until they are deleted.
    #[default]
    Append,
    /// Overwrites `FullName` and `City` of the existing record(s), keeping ids unique.
    Upsert,
}

/// Configuration for the merge engine.
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// How inserts for an already present id are handled.
    pub duplicate_key_policy: DuplicateKeyPolicy,

    /// Initial capacity for the id index (optimization).
    pub index_initial_capacity: usize,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            duplicate_key_policy: DuplicateKeyPolicy::default(),
            index_initial_capacity: 1_024,
        }
    }
}

impl MergerConfig {
    /// Creates a new configuration with the given duplicate key policy.
    pub fn new(duplicate_key_policy: DuplicateKeyPolicy) -> Self {
        Self {
            duplicate_key_policy,
            ..Default::default()
        }
    }
}
