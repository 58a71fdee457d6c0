//! Builds the initial snapshot from a first-load extract.

use std::io;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{MergerError, MergerResult};
use crate::record::{Record, SNAPSHOT_COLUMNS, Snapshot};

/// Reads a headerless three-column extract and names its columns `id`,
/// `FullName` and `City`, in that order.
///
/// Fields beyond the third are ignored. A row with fewer than three fields
/// fails the whole load, so a broken extract never yields a partial snapshot.
pub fn load_initial_snapshot<R: io::Read>(reader: R) -> MergerResult<Snapshot> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result?;
        if row.len() < SNAPSHOT_COLUMNS.len() {
            let line = row
                .position()
                .map(|position| position.line())
                .unwrap_or(row_idx as u64 + 1);
            return Err(MergerError::MalformedRow {
                line,
                expected: SNAPSHOT_COLUMNS.len(),
                found: row.len(),
            });
        }

        records.push(Record::new(&row[0], &row[1], &row[2]));
    }

    debug!(rows = records.len(), "initial load extract read");

    Ok(Snapshot::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_assigns_canonical_columns() {
        let snapshot = load_initial_snapshot("1,Alice,NYC\n2,Bob,LA\n".as_bytes()).unwrap();

        assert_eq!(
            snapshot.records(),
            &[Record::new("1", "Alice", "NYC"), Record::new("2", "Bob", "LA")]
        );
    }

    #[test]
    fn test_load_ignores_extra_fields() {
        let snapshot = load_initial_snapshot("1,Alice,NYC,extra\n".as_bytes()).unwrap();

        assert_eq!(snapshot.records(), &[Record::new("1", "Alice", "NYC")]);
    }

    #[test]
    fn test_load_rejects_short_rows() {
        let err = load_initial_snapshot("1,Alice,NYC\n2,Bob\n".as_bytes()).unwrap_err();

        match err {
            MergerError::MalformedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_is_deterministic() {
        let input = "1,Alice,NYC\n2,Bob,LA\n";

        let first = load_initial_snapshot(input.as_bytes()).unwrap();
        let second = load_initial_snapshot(input.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_empty_extract() {
        let snapshot = load_initial_snapshot("".as_bytes()).unwrap();
        assert!(snapshot.is_empty());
    }
}
