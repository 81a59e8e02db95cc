//! Common types used throughout tagforge.
//!
//! This module contains the record model, edit descriptors and the request
//! types accepted by the editor.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TagError;

// ============================================================================
// RecordKey
// ============================================================================

/// Stable, unique identifier of a record.
///
/// Keys are assigned by whoever loads the records and are never reused or
/// renumbered by the core. Every edit addresses its record by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

impl RecordKey {
    /// Get the raw key value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordKey {
    fn from(key: u64) -> Self {
        Self(key)
    }
}

// ============================================================================
// Record
// ============================================================================

/// A media record and its ordered tag list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable key used to address the record in edits.
    pub key: RecordKey,
    /// Display name (usually the file name).
    pub name: String,
    /// Source location of the media (path or URL).
    pub location: String,
    /// Tags in display order.
    pub tags: Vec<String>,
}

impl Record {
    /// Create a new record.
    pub fn new(
        key: u64,
        name: impl Into<String>,
        location: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            key: RecordKey(key),
            name: name.into(),
            location: location.into(),
            tags,
        }
    }

    /// Check whether the record carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// ============================================================================
// EditAction / Batch
// ============================================================================

/// Desired replacement of one record's full tag list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditAction {
    /// The record to edit.
    pub key: RecordKey,
    /// The complete new tag list for that record.
    pub tags: Vec<String>,
}

impl EditAction {
    /// Create a new edit action.
    pub fn new(key: u64, tags: Vec<String>) -> Self {
        Self {
            key: RecordKey(key),
            tags,
        }
    }
}

/// Ordered edit actions produced by one bulk operation.
///
/// A batch never holds two actions for the same record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<EditAction>);

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of edit actions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the batch carries no edits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the edit actions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, EditAction> {
        self.0.iter()
    }

    /// Keys of the records this batch edits, in order.
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.0.iter().map(|action| action.key)
    }

    /// Find the action for a given record.
    pub fn get(&self, key: RecordKey) -> Option<&EditAction> {
        self.0.iter().find(|action| action.key == key)
    }
}

impl From<Vec<EditAction>> for Batch {
    fn from(actions: Vec<EditAction>) -> Self {
        Self(actions)
    }
}

impl FromIterator<EditAction> for Batch {
    fn from_iter<I: IntoIterator<Item = EditAction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Batch {
    type Item = EditAction;
    type IntoIter = std::vec::IntoIter<EditAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a EditAction;
    type IntoIter = std::slice::Iter<'a, EditAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// InsertPosition
// ============================================================================

/// Where inserted tags land in each record's tag list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertPosition {
    /// Append at the end of the list.
    #[default]
    Auto,
    /// Zero-based offset; negative values count from the end (`-1` is before
    /// the last tag). Offsets outside the list clamp to its bounds.
    Offset(isize),
}

impl From<Option<isize>> for InsertPosition {
    fn from(position: Option<isize>) -> Self {
        match position {
            Some(offset) => Self::Offset(offset),
            None => Self::Auto,
        }
    }
}

impl FromStr for InsertPosition {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<isize>().map(Self::Offset).map_err(|_| {
            TagError::InvalidArgument(format!(
                "Invalid insert position '{}'. Use 'auto' or a signed integer.",
                s
            ))
        })
    }
}

impl std::fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Offset(offset) => write!(f, "{}", offset),
        }
    }
}

// ============================================================================
// FilterMode
// ============================================================================

/// How a tag filter selects records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Records carrying at least one of the tags.
    #[default]
    IncludeAny,
    /// Records carrying every one of the tags.
    IncludeAll,
    /// Records carrying none of the tags.
    Exclude,
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncludeAny => write!(f, "include-any"),
            Self::IncludeAll => write!(f, "include-all"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

// ============================================================================
// TagOperation
// ============================================================================

/// One user-initiated bulk tag operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TagOperation {
    /// Insert tags into every record.
    Insert {
        /// Tags to insert.
        tags: Vec<String>,
        /// Where to insert them.
        #[serde(default)]
        position: InsertPosition,
    },

    /// Remove tags from every record carrying them.
    Delete {
        /// Tags to remove.
        tags: Vec<String>,
    },

    /// Rename or merge tags.
    Replace {
        /// Source tags.
        from: Vec<String>,
        /// Replacement tags; surplus entries attach to the last source tag.
        to: Vec<String>,
    },
}

impl TagOperation {
    /// Short name of the operation for logs and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
        }
    }
}
