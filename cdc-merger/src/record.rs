//! Records and snapshots of the materialized dataset.

use serde::{Deserialize, Serialize};

/// Column name of the business key.
pub const ID_COLUMN_NAME: &str = "id";
/// Column name of the full name field.
pub const FULL_NAME_COLUMN_NAME: &str = "FullName";
/// Column name of the city field.
pub const CITY_COLUMN_NAME: &str = "City";

/// Canonical snapshot columns, in positional order.
pub const SNAPSHOT_COLUMNS: [&str; 3] = [ID_COLUMN_NAME, FULL_NAME_COLUMN_NAME, CITY_COLUMN_NAME];

/// A single row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Stable business key.
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "City")]
    pub city: String,
}

impl Record {
    /// Creates a new record.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            city: city.into(),
        }
    }
}

/// The full current state of the dataset.
///
/// A snapshot is conceptually unordered, but it keeps the order in which its
/// records were produced: base records first, then records appended by inserts.
/// This keeps merge output deterministic. Use [`Snapshot::sorted_by_id`] when
/// comparing snapshots without regard to order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    /// Creates a snapshot from the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Creates an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the records of the snapshot.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the snapshot and returns its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Returns the first record with the given id.
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Returns how many records carry the given id.
    pub fn count_id(&self, id: &str) -> usize {
        self.records.iter().filter(|record| record.id == id).count()
    }

    /// Returns true if no two records share an id.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.records.len());
        self.records.iter().all(|record| seen.insert(record.id.as_str()))
    }

    /// Returns the records ordered by id, for order-insensitive comparisons.
    ///
    /// The sort is stable, so records sharing an id keep their relative order.
    pub fn sorted_by_id(&self) -> Vec<Record> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

impl FromIterator<Record> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Snapshot {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
