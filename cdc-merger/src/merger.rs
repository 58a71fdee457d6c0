//! Merge engine that applies a batch of change records to a snapshot.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::change::{ChangeAction, ChangeRecord};
use crate::config::{DuplicateKeyPolicy, MergerConfig};
use crate::index::{IndexStats, KeyIndex, RowSlot};
use crate::record::{Record, Snapshot};

/// Summary of a single merge.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Total change records seen, including skipped ones.
    pub events_processed: usize,
    /// Number of applied insert operations.
    pub inserts: usize,
    /// Number of update operations that matched at least one record.
    pub updates: usize,
    /// Number of delete operations that matched at least one record.
    pub deletes: usize,
    /// Updates whose id was absent.
    pub missed_updates: usize,
    /// Deletes whose id was absent.
    pub missed_deletes: usize,
    /// Inserts whose id was already present.
    pub duplicate_inserts: usize,
    /// Change records skipped because of an unknown action.
    pub skipped: usize,
    /// Number of records in the base snapshot.
    pub records_before: usize,
    /// Number of records in the merged snapshot.
    pub records_after: usize,
}

/// Result of a merge: the new snapshot and what it took to get there.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The merged snapshot.
    pub snapshot: Snapshot,
    /// Counters of the applied changes.
    pub summary: MergeSummary,
    /// Operation counters of the id index.
    pub index_stats: IndexStats,
}

/// Working state of one merge.
///
/// Rows live in slots that are never moved; a delete leaves a tombstone so
/// the slots recorded in the index stay valid for the whole batch.
struct MergeState {
    slots: Vec<Option<Record>>,
    index: KeyIndex,
}

impl MergeState {
    fn from_snapshot(base: Snapshot, capacity: usize) -> Self {
        let mut index = KeyIndex::with_capacity(capacity.max(base.len()));
        let slots: Vec<Option<Record>> = base
            .into_records()
            .into_iter()
            .enumerate()
            .map(|(slot, record)| {
                index.insert(&record.id, slot);
                Some(record)
            })
            .collect();

        Self { slots, index }
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    fn append(&mut self, record: Record) -> RowSlot {
        let slot = self.slots.len();
        self.index.insert(&record.id, slot);
        self.slots.push(Some(record));
        slot
    }

    /// Rewrites the non-key fields of every row with the given id.
    ///
    /// Returns the number of rows touched.
    fn rewrite(&mut self, id: &str, full_name: &str, city: &str) -> usize {
        let Some(slots) = self.index.get(id) else {
            return 0;
        };

        for &slot in slots {
            if let Some(record) = self.slots[slot].as_mut() {
                record.full_name.clear();
                record.full_name.push_str(full_name);
                record.city.clear();
                record.city.push_str(city);
            }
        }

        slots.len()
    }

    /// Removes every row with the given id.
    ///
    /// Returns the number of rows removed.
    fn remove(&mut self, id: &str) -> usize {
        let Some(slots) = self.index.remove(id) else {
            return 0;
        };

        for &slot in &slots {
            self.slots[slot] = None;
        }

        slots.len()
    }

    fn finish(self) -> (Snapshot, IndexStats) {
        let stats = self.index.stats().clone();
        let snapshot = self.slots.into_iter().flatten().collect();
        (snapshot, stats)
    }
}

/// The merge engine.
///
/// Change records are applied strictly in batch order, because a later record
/// can depend on the effect of an earlier one on the same id. The merge is a
/// pure function of the base snapshot and the batch; it performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergerConfig,
}

impl Merger {
    /// Creates a new merger.
    pub fn new(config: MergerConfig) -> Self {
        Self { config }
    }

    /// Returns the merger configuration.
    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// Applies a batch of change records to a base snapshot.
    pub fn merge<I>(&self, base: Snapshot, changes: I) -> MergeOutcome
    where
        I: IntoIterator<Item = ChangeRecord>,
    {
        let mut summary = MergeSummary {
            records_before: base.len(),
            ..Default::default()
        };

        debug!(
            records = base.len(),
            policy = ?self.config.duplicate_key_policy,
            "starting merge"
        );

        let mut state = MergeState::from_snapshot(base, self.config.index_initial_capacity);
        for (position, change) in changes.into_iter().enumerate() {
            summary.events_processed += 1;
            self.apply(&mut state, change, position, &mut summary);
        }

        let (snapshot, index_stats) = state.finish();
        summary.records_after = snapshot.len();

        info!(
            events = summary.events_processed,
            inserts = summary.inserts,
            updates = summary.updates,
            deletes = summary.deletes,
            skipped = summary.skipped,
            records = summary.records_after,
            "merge completed"
        );

        MergeOutcome {
            snapshot,
            summary,
            index_stats,
        }
    }

    fn apply(
        &self,
        state: &mut MergeState,
        change: ChangeRecord,
        position: usize,
        summary: &mut MergeSummary,
    ) {
        match change.action {
            ChangeAction::Insert => {
                if state.contains(&change.id) {
                    summary.duplicate_inserts += 1;
                    warn!(
                        id = %change.id,
                        position,
                        policy = ?self.config.duplicate_key_policy,
                        "insert for an id that is already present"
                    );

                    if self.config.duplicate_key_policy == DuplicateKeyPolicy::Upsert {
                        state.rewrite(&change.id, &change.full_name, &change.city);
                        summary.inserts += 1;
                        return;
                    }
                }

                state.append(Record::new(change.id, change.full_name, change.city));
                summary.inserts += 1;
            }
            ChangeAction::Update => {
                if state.rewrite(&change.id, &change.full_name, &change.city) == 0 {
                    debug!(id = %change.id, position, "update for an absent id, ignoring");
                    summary.missed_updates += 1;
                } else {
                    summary.updates += 1;
                }
            }
            ChangeAction::Delete => {
                if state.remove(&change.id) == 0 {
                    debug!(id = %change.id, position, "delete for an absent id, ignoring");
                    summary.missed_deletes += 1;
                } else {
                    summary.deletes += 1;
                }
            }
            ChangeAction::Unknown(tag) => {
                warn!(%tag, id = %change.id, position, "skipping change record with unknown action");
                summary.skipped += 1;
            }
        }
    }
}
