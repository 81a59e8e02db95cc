//! Tag editor – the entry point for bulk tag editing.
//!
//! [`TagEditor`] ties the planner to the edit history: every request is
//! planned against the live records and index, then applied as one batch.
//! Undo and redo go straight to the history and never re-plan.

use std::collections::BTreeSet;

use crate::errors::TagError;
use crate::history::EditHistory;
use crate::index::TagIndex;
use crate::planner;
use crate::types::{Batch, FilterMode, InsertPosition, Record, RecordKey, TagOperation};

/// Editing session over one record set.
///
/// # Example
///
/// ```
/// use tagforge_core::{InsertPosition, Record, TagEditor};
///
/// let records = vec![Record::new(1, "a.png", "/data/a.png", vec!["a".into(), "b".into()])];
/// let mut editor = TagEditor::new(records)?;
///
/// editor.insert(&["c"], InsertPosition::Offset(-1))?;
/// assert_eq!(editor.records()[0].tags, ["a", "c", "b"]);
///
/// editor.undo();
/// assert_eq!(editor.records()[0].tags, ["a", "b"]);
/// # Ok::<(), tagforge_core::TagError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TagEditor {
    history: EditHistory,
}

impl TagEditor {
    /// Start a session over `records`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::DuplicateRecordKey`] if two records share a key.
    pub fn new(records: Vec<Record>) -> Result<Self, TagError> {
        Ok(Self {
            history: EditHistory::new(records)?,
        })
    }

    // -------------------------------------------------------------------------
    // Planning and editing
    // -------------------------------------------------------------------------

    /// Plan an operation against the live records without applying it.
    pub fn plan(&self, operation: &TagOperation) -> Batch {
        planner::plan(self.history.records(), self.history.index(), operation)
    }

    /// Plan and apply an operation as one undoable batch.
    ///
    /// Returns `Ok(None)` when the operation changes nothing.
    pub fn execute(&mut self, operation: &TagOperation) -> Result<Option<&[Record]>, TagError> {
        let batch = self.plan(operation);
        tracing::debug!("Executing {} ({} edit(s))", operation.name(), batch.len());
        self.history.apply(batch)
    }

    /// Insert tags into every record.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        tags: &[S],
        position: InsertPosition,
    ) -> Result<Option<&[Record]>, TagError> {
        let batch = planner::plan_insert(self.history.records(), tags, position);
        self.history.apply(batch)
    }

    /// Remove tags from every record carrying them.
    pub fn delete<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<Option<&[Record]>, TagError> {
        let batch = planner::plan_delete(self.history.records(), self.history.index(), tags);
        self.history.apply(batch)
    }

    /// Rename or merge tags.
    pub fn replace<F: AsRef<str>, T: AsRef<str>>(
        &mut self,
        from: &[F],
        to: &[T],
    ) -> Result<Option<&[Record]>, TagError> {
        let batch = planner::plan_replace(self.history.records(), from, to);
        self.history.apply(batch)
    }

    /// Revert the most recent edit.
    pub fn undo(&mut self) -> Option<&[Record]> {
        self.history.undo()
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Option<&[Record]> {
        self.history.redo()
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn records(&self) -> &[Record] {
        self.history.records()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.history.snapshot()
    }

    pub fn index(&self) -> &TagIndex {
        self.history.index()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Keys of the records carrying `tag`.
    pub fn lookup(&self, tag: &str) -> Option<&BTreeSet<RecordKey>> {
        self.history.index().lookup(tag)
    }

    /// Distinct tags across all records, in first-seen order.
    pub fn tags(&self) -> &[String] {
        self.history.index().order()
    }

    /// Records selected by a tag filter, in record order.
    pub fn filter<S: AsRef<str>>(&self, tags: &[S], mode: FilterMode) -> Vec<&Record> {
        self.history
            .index()
            .filter(self.history.records(), tags, mode)
            .into_iter()
            .filter_map(|key| self.history.record(key))
            .collect()
    }

    /// End the session and take the records back.
    pub fn into_records(self) -> Vec<Record> {
        self.history.into_records()
    }
}
