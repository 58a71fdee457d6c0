//! CSV encoding of snapshots and change batches.
//!
//! Snapshots are stored with a header row naming the canonical columns.
//! Change batches have no header and four positional columns:
//! `action,id,FullName,City`.

use std::io;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::change::{ChangeAction, ChangeBatch, ChangeRecord};
use crate::error::{MergerError, MergerResult};
use crate::record::{Record, SNAPSHOT_COLUMNS, Snapshot};

/// Minimum fields a batch row needs to address a record: the action and the id.
const MIN_BATCH_FIELDS: usize = 2;

/// Reads a snapshot written by [`write_snapshot`].
///
/// Input without any row, not even a header, is an empty snapshot. Otherwise
/// the header must be exactly `id,FullName,City`.
pub fn read_snapshot<R: io::Read>(reader: R) -> MergerResult<Snapshot> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Snapshot::empty());
    }

    if headers.iter().ne(SNAPSHOT_COLUMNS) {
        return Err(MergerError::InvalidHeader {
            expected: SNAPSHOT_COLUMNS.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let records = reader
        .deserialize::<Record>()
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = records.len(), "snapshot read");

    Ok(Snapshot::new(records))
}

/// Writes a snapshot with its header row.
///
/// The header is written even when the snapshot is empty.
pub fn write_snapshot<W: io::Write>(writer: W, snapshot: &Snapshot) -> MergerResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(SNAPSHOT_COLUMNS)?;
    for record in snapshot {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Encodes a snapshot into an in-memory buffer.
pub fn snapshot_to_bytes(snapshot: &Snapshot) -> MergerResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_snapshot(&mut buffer, snapshot)?;
    Ok(buffer)
}

/// Reads a headerless change batch.
///
/// Rows with fewer than two fields carry no id and are dropped with a warning;
/// their line numbers end up in [`ChangeBatch::skipped_lines`]. Missing
/// `FullName` or `City` fields read as empty strings.
pub fn read_change_batch<R: io::Read>(reader: R) -> MergerResult<ChangeBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut batch = ChangeBatch::empty();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result?;
        match change_from_row(&row) {
            Some(change) => batch.entries.push(change),
            None => {
                let line = row
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(row_idx as u64 + 1);
                warn!(line, fields = row.len(), "skipping change row without an id");
                batch.skipped_lines.push(line);
            }
        }
    }

    debug!(
        entries = batch.entries.len(),
        skipped = batch.skipped_lines.len(),
        "change batch read"
    );

    Ok(batch)
}

fn change_from_row(row: &StringRecord) -> Option<ChangeRecord> {
    if row.len() < MIN_BATCH_FIELDS {
        return None;
    }

    Some(ChangeRecord::new(
        ChangeAction::from(&row[0]),
        &row[1],
        row.get(2).unwrap_or_default(),
        row.get(3).unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_encoding_has_header() {
        let snapshot = Snapshot::new(vec![Record::new("1", "Alice", "NYC")]);
        let bytes = snapshot_to_bytes(&snapshot).unwrap();

        assert_eq!(String::from_utf8(bytes).unwrap(), "id,FullName,City\n1,Alice,NYC\n");
    }

    #[test]
    fn test_empty_snapshot_keeps_header() {
        let bytes = snapshot_to_bytes(&Snapshot::empty()).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "id,FullName,City\n");

        let decoded = read_snapshot(bytes.as_slice()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_snapshot_with_quoted_fields_decodes() {
        let snapshot = Snapshot::new(vec![Record::new("1", "Smith, Alice", "New \"York\"")]);
        let bytes = snapshot_to_bytes(&snapshot).unwrap();

        assert_eq!(read_snapshot(bytes.as_slice()).unwrap(), snapshot);
    }

    #[test]
    fn test_read_snapshot_rejects_wrong_header() {
        let err = read_snapshot("_c0,_c1,_c2\n1,Alice,NYC\n".as_bytes()).unwrap_err();

        assert!(matches!(err, MergerError::InvalidHeader { .. }));
    }

    #[test]
    fn test_read_snapshot_from_nothing_is_empty() {
        assert!(read_snapshot("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_read_change_batch_maps_positional_columns() {
        let batch = read_change_batch("I,3,Carol,SF\nU,1,Alicia,NYC\nD,2,_,_\n".as_bytes()).unwrap();

        assert_eq!(
            batch.entries,
            vec![
                ChangeRecord::insert("3", "Carol", "SF"),
                ChangeRecord::update("1", "Alicia", "NYC"),
                ChangeRecord::new(ChangeAction::Delete, "2", "_", "_"),
            ]
        );
        assert!(batch.skipped_lines.is_empty());
    }

    #[test]
    fn test_read_change_batch_tolerates_short_rows() {
        let batch = read_change_batch("D,2\nX\nU,1,Alicia,NYC\n".as_bytes()).unwrap();

        assert_eq!(
            batch.entries,
            vec![
                ChangeRecord::delete("2"),
                ChangeRecord::update("1", "Alicia", "NYC"),
            ]
        );
        assert_eq!(batch.skipped_lines, vec![2]);
    }

    #[test]
    fn test_read_change_batch_keeps_unknown_actions() {
        let batch = read_change_batch("Z,1,Alice,NYC\n".as_bytes()).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entries[0].action, ChangeAction::Unknown("Z".to_string()));
    }

    #[test]
    fn test_read_change_batch_accepts_word_tags() {
        let contents = "insert,1,Alice,NYC\n UPDATE ,1,Alicia,NYC\nd,1,,\n";
        let batch = read_change_batch(contents.as_bytes()).unwrap();

        assert_eq!(
            batch
                .entries
                .iter()
                .map(|change| change.action.clone())
                .collect::<Vec<_>>(),
            vec![
                ChangeAction::Insert,
                ChangeAction::Update,
                ChangeAction::Unknown("d".to_string()),
            ]
        );
    }
}
