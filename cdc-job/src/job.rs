//! The merge job: classify an input object, then load or merge it into the snapshot.

use cdc_config::shared::{self, JobConfig};
use cdc_merger::{
    DuplicateKeyPolicy, MergeSummary, Merger, MergerConfig, Snapshot, codec,
    load_initial_snapshot,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{JobError, JobResult};
use crate::location::StorageLocation;
use crate::storage::{LocalObjectStore, ObjectStore};

/// Kind of input a job run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// A full first-load extract that replaces the snapshot.
    Load,
    /// A change batch merged into the current snapshot.
    Update,
}

impl BatchKind {
    /// Classifies an input object by its key: keys containing the load marker
    /// are initial loads, everything else is an update batch.
    pub fn classify(key: &str, load_marker: &str) -> Self {
        if key.contains(load_marker) {
            BatchKind::Load
        } else {
            BatchKind::Update
        }
    }
}

/// Arguments of a job run, as passed by the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArgs {
    /// Bucket of the input object.
    pub bucket: String,
    /// Key of the input object.
    pub key: String,
}

impl JobArgs {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Returns the location of the input object.
    pub fn input_location(&self) -> JobResult<StorageLocation> {
        StorageLocation::new(self.bucket.clone(), self.key.clone())
    }
}

impl From<StorageLocation> for JobArgs {
    fn from(location: StorageLocation) -> Self {
        Self {
            bucket: location.bucket,
            key: location.key,
        }
    }
}

/// Outcome of a successful job run.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub kind: BatchKind,
    pub input: StorageLocation,
    pub snapshot: StorageLocation,
    /// Records in the written snapshot.
    pub records_written: usize,
    /// Batch rows dropped because they had no id. Always zero for loads.
    pub skipped_rows: usize,
    /// Merge counters, present for update batches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs jobs against an object store.
#[derive(Debug, Clone)]
pub struct JobRunner<S> {
    store: S,
    snapshot: StorageLocation,
    load_marker: String,
    merger: Merger,
}

impl<S: ObjectStore> JobRunner<S> {
    /// Creates a runner writing the snapshot at `snapshot`.
    pub fn new(store: S, snapshot: StorageLocation, load_marker: String, merger: Merger) -> Self {
        Self {
            store,
            snapshot,
            load_marker,
            merger,
        }
    }

    /// Creates a runner from job configuration.
    pub fn from_config(store: S, config: &JobConfig) -> JobResult<Self> {
        config.validate()?;

        let snapshot =
            StorageLocation::new(config.snapshot.bucket.clone(), config.snapshot.key.clone())?;
        let merger = Merger::new(MergerConfig::new(duplicate_key_policy(
            config.merge.duplicate_key_policy,
        )));

        Ok(Self::new(
            store,
            snapshot,
            config.merge.load_marker.clone(),
            merger,
        ))
    }

    /// Returns the store the runner reads from and writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the location of the snapshot.
    pub fn snapshot_location(&self) -> &StorageLocation {
        &self.snapshot
    }

    /// Processes one input object.
    ///
    /// The snapshot is only written after the whole input has been read and
    /// merged, so a failed run leaves the previous snapshot untouched.
    pub fn run(&self, args: &JobArgs) -> JobResult<JobReport> {
        let started_at = Utc::now();
        let input = args.input_location()?;
        let kind = BatchKind::classify(&input.key, &self.load_marker);

        info!(%input, snapshot = %self.snapshot, ?kind, "starting job run");

        let contents = self
            .store
            .get(&input)?
            .ok_or_else(|| JobError::InputMissing(input.clone()))?;

        let (snapshot, skipped_rows, merge) = match kind {
            BatchKind::Load => (load_initial_snapshot(contents.as_slice())?, 0, None),
            BatchKind::Update => {
                let batch = codec::read_change_batch(contents.as_slice())?;
                let base = self.read_snapshot()?;

                debug!(
                    changes = batch.len(),
                    records = base.len(),
                    "merging change batch"
                );

                let skipped_rows = batch.skipped_lines.len();
                let outcome = self.merger.merge(base, batch.entries);
                (outcome.snapshot, skipped_rows, Some(outcome.summary))
            }
        };

        let encoded = codec::snapshot_to_bytes(&snapshot)?;
        self.store.put(&self.snapshot, &encoded)?;

        let report = JobReport {
            kind,
            input,
            snapshot: self.snapshot.clone(),
            records_written: snapshot.len(),
            skipped_rows,
            merge,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            kind = ?report.kind,
            records = report.records_written,
            skipped_rows = report.skipped_rows,
            "job run completed"
        );

        Ok(report)
    }

    fn read_snapshot(&self) -> JobResult<Snapshot> {
        let contents = self
            .store
            .get(&self.snapshot)?
            .ok_or_else(|| JobError::SnapshotMissing(self.snapshot.clone()))?;

        Ok(codec::read_snapshot(contents.as_slice())?)
    }
}

/// Runs a job against the filesystem store described by the configuration.
pub fn run_job(config: &JobConfig, args: &JobArgs) -> JobResult<JobReport> {
    let store = LocalObjectStore::new(config.storage.root.clone());
    JobRunner::from_config(store, config)?.run(args)
}

fn duplicate_key_policy(policy: shared::DuplicateKeyPolicy) -> DuplicateKeyPolicy {
    match policy {
        shared::DuplicateKeyPolicy::Append => DuplicateKeyPolicy::Append,
        shared::DuplicateKeyPolicy::Upsert => DuplicateKeyPolicy::Upsert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use cdc_merger::Record;

    const INPUT_BUCKET: &str = "cdc-input";

    fn runner(store: MemoryObjectStore, policy: DuplicateKeyPolicy) -> JobRunner<MemoryObjectStore> {
        JobRunner::new(
            store,
            StorageLocation::new("snapshots", "output").unwrap(),
            "LOAD".to_string(),
            Merger::new(MergerConfig::new(policy)),
        )
    }

    fn put_input(store: &MemoryObjectStore, key: &str, contents: &str) -> JobArgs {
        store
            .put(
                &StorageLocation::new(INPUT_BUCKET, key).unwrap(),
                contents.as_bytes(),
            )
            .unwrap();
        JobArgs::new(INPUT_BUCKET, key)
    }

    fn stored_snapshot(runner: &JobRunner<MemoryObjectStore>) -> Snapshot {
        let bytes = runner
            .store()
            .get(runner.snapshot_location())
            .unwrap()
            .expect("snapshot missing");
        codec::read_snapshot(bytes.as_slice()).unwrap()
    }

    #[test]
    fn test_classify_by_load_marker() {
        assert_eq!(BatchKind::classify("LOAD00000001.csv", "LOAD"), BatchKind::Load);
        assert_eq!(BatchKind::classify("dms/LOAD-full.csv", "LOAD"), BatchKind::Load);
        assert_eq!(BatchKind::classify("20240101-120000.csv", "LOAD"), BatchKind::Update);
        // Matching is case sensitive.
        assert_eq!(BatchKind::classify("load.csv", "LOAD"), BatchKind::Update);
    }

    #[test]
    fn test_load_then_update_end_to_end() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Append);

        let args = put_input(&store, "LOAD00000001.csv", "1,Alice,NYC\n2,Bob,LA\n");
        let report = runner.run(&args).unwrap();
        assert_eq!(report.kind, BatchKind::Load);
        assert_eq!(report.records_written, 2);
        assert!(report.merge.is_none());

        let args = put_input(
            &store,
            "20240101-120000.csv",
            "I,3,Carol,SF\nU,1,Alicia,NYC\nD,2,_,_\n",
        );
        let report = runner.run(&args).unwrap();
        assert_eq!(report.kind, BatchKind::Update);
        assert_eq!(report.records_written, 2);

        let summary = report.merge.unwrap();
        assert_eq!(summary.inserts, 1);
        assert_eq!(summary.updates, 1);
        assert_eq!(summary.deletes, 1);

        assert_eq!(
            stored_snapshot(&runner).sorted_by_id(),
            vec![Record::new("1", "Alicia", "NYC"), Record::new("3", "Carol", "SF")]
        );
    }

    #[test]
    fn test_reloading_replaces_snapshot() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Append);

        let args = put_input(&store, "LOAD1.csv", "1,Alice,NYC\n2,Bob,LA\n");
        runner.run(&args).unwrap();
        let first = stored_snapshot(&runner);
        runner.run(&args).unwrap();
        assert_eq!(stored_snapshot(&runner), first);

        let args = put_input(&store, "LOAD2.csv", "9,Zed,Oslo\n");
        runner.run(&args).unwrap();
        assert_eq!(
            stored_snapshot(&runner).records(),
            &[Record::new("9", "Zed", "Oslo")]
        );
    }

    #[test]
    fn test_malformed_load_keeps_previous_snapshot() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Append);

        runner
            .run(&put_input(&store, "LOAD1.csv", "1,Alice,NYC\n"))
            .unwrap();

        let err = runner
            .run(&put_input(&store, "LOAD2.csv", "2,Bob,LA\n3,Carol\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::Merger(cdc_merger::MergerError::MalformedRow { line: 2, .. })
        ));

        assert_eq!(
            stored_snapshot(&runner).records(),
            &[Record::new("1", "Alice", "NYC")]
        );
    }

    #[test]
    fn test_update_without_snapshot_fails() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Append);

        let err = runner
            .run(&put_input(&store, "batch.csv", "I,1,Alice,NYC\n"))
            .unwrap_err();

        assert!(matches!(err, JobError::SnapshotMissing(_)));
        assert!(!store.exists(runner.snapshot_location()).unwrap());
    }

    #[test]
    fn test_missing_input_fails() {
        let store = MemoryObjectStore::new();
        let runner = runner(store, DuplicateKeyPolicy::Append);

        let err = runner.run(&JobArgs::new(INPUT_BUCKET, "nope.csv")).unwrap_err();

        assert!(matches!(err, JobError::InputMissing(_)));
    }

    #[test]
    fn test_update_reports_skipped_rows_and_uses_policy() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Upsert);

        runner
            .run(&put_input(&store, "LOAD.csv", "1,Alice,NYC\n"))
            .unwrap();
        let report = runner
            .run(&put_input(&store, "b1.csv", "I,1,Alice,Rome\nQ\nX,1,Eve,Nowhere\n"))
            .unwrap();

        assert_eq!(report.skipped_rows, 1);
        let summary = report.merge.unwrap();
        assert_eq!(summary.duplicate_inserts, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            stored_snapshot(&runner).records(),
            &[Record::new("1", "Alice", "Rome")]
        );
    }

    #[test]
    fn test_report_serializes_to_json() {
        let store = MemoryObjectStore::new();
        let runner = runner(store.clone(), DuplicateKeyPolicy::Append);

        let load = runner
            .run(&put_input(&store, "LOAD.csv", "1,Alice,NYC\n"))
            .unwrap();
        let json = serde_json::to_value(&load).unwrap();
        assert_eq!(json["kind"], "load");
        assert_eq!(json["records_written"], 1);
        assert!(json.get("merge").is_none());

        let update = runner
            .run(&put_input(&store, "b1.csv", "I,2,Bob,LA\nD,1,_,_\n"))
            .unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "update");
        assert_eq!(json["input"]["key"], "b1.csv");
        assert_eq!(json["merge"]["inserts"], 1);
        assert_eq!(json["merge"]["deletes"], 1);
    }
}
