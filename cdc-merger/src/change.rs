//! Change records and the batches that carry them.

use std::fmt;

/// Tag written for inserts in batch files.
pub const INSERT_TAG: &str = "I";
/// Tag written for updates in batch files.
pub const UPDATE_TAG: &str = "U";
/// Tag written for deletes in batch files.
pub const DELETE_TAG: &str = "D";

/// CDC action types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Insert operation.
    Insert,
    /// Update operation.
    Update,
    /// Delete operation.
    Delete,
    /// An action tag that is none of the above.
    ///
    /// The tag is kept as read so the merger can report it. Records with an
    /// unknown action are skipped.
    Unknown(String),
}

impl ChangeAction {
    /// Returns the tag used for this action in batch files.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Insert => INSERT_TAG,
            Self::Update => UPDATE_TAG,
            Self::Delete => DELETE_TAG,
            Self::Unknown(tag) => tag,
        }
    }

    /// Returns true if the action is one the merger applies.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for ChangeAction {
    /// Parses an action tag.
    ///
    /// Accepts the single letter tags `I`, `U` and `D` as well as the words
    /// `INSERT`, `UPDATE` and `DELETE` in any case. Surrounding whitespace is
    /// ignored. Anything else becomes [`ChangeAction::Unknown`].
    ///
    /// The word forms and the trimming are lenient extensions of the batch
    /// format, which only defines the exact uppercase letters. Single letters
    /// stay case sensitive, so `u` is unknown.
    fn from(tag: &str) -> Self {
        let trimmed = tag.trim();
        match trimmed {
            INSERT_TAG => return Self::Insert,
            UPDATE_TAG => return Self::Update,
            DELETE_TAG => return Self::Delete,
            _ => {}
        }

        if trimmed.eq_ignore_ascii_case("insert") {
            Self::Insert
        } else if trimmed.eq_ignore_ascii_case("update") {
            Self::Update
        } else if trimmed.eq_ignore_ascii_case("delete") {
            Self::Delete
        } else {
            Self::Unknown(tag.to_string())
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A single tagged mutation targeting a business key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// The action to apply.
    pub action: ChangeAction,
    /// The business key the change targets.
    pub id: String,
    pub full_name: String,
    pub city: String,
}

impl ChangeRecord {
    /// Creates a new change record.
    pub fn new(
        action: ChangeAction,
        id: impl Into<String>,
        full_name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            action,
            id: id.into(),
            full_name: full_name.into(),
            city: city.into(),
        }
    }

    pub fn insert(
        id: impl Into<String>,
        full_name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self::new(ChangeAction::Insert, id, full_name, city)
    }

    pub fn update(
        id: impl Into<String>,
        full_name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self::new(ChangeAction::Update, id, full_name, city)
    }

    /// Creates a delete; only the id of a delete is meaningful.
    pub fn delete(id: impl Into<String>) -> Self {
        Self::new(ChangeAction::Delete, id, "", "")
    }
}

/// A batch of change records ready for merging.
#[derive(Debug, Default)]
pub struct ChangeBatch {
    /// The change records in batch order.
    pub entries: Vec<ChangeRecord>,
    /// Line numbers of rows that could not form a change record and were dropped.
    pub skipped_lines: Vec<u64>,
}

impl ChangeBatch {
    /// Creates an empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a batch from change records.
    pub fn new(entries: Vec<ChangeRecord>) -> Self {
        Self {
            entries,
            skipped_lines: Vec::new(),
        }
    }

    /// Returns the number of change records in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch has no change records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
