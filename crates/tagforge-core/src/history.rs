//! Edit history: applies batches and keeps them reversible.
//!
//! [`EditHistory`] owns the record sequence, the tag index and two stacks of
//! inverse batches. Every mutation goes through [`EditHistory::apply`],
//! [`EditHistory::undo`] or [`EditHistory::redo`]; there is no other way to
//! change a record's tags, so the stacks can never drift from the records.
//!
//! Each of the three operations captures a record's current tags before
//! overwriting them, which makes undo and redo exact inverses of each other
//! (tag order included) no matter how often they alternate.

use std::collections::{HashMap, HashSet};

use crate::errors::TagError;
use crate::index::TagIndex;
use crate::types::{Batch, EditAction, Record, RecordKey};

/// Record set plus undo/redo stacks.
#[derive(Debug, Clone)]
pub struct EditHistory {
    records: Vec<Record>,
    /// Record key → position in `records`. Records are never added, removed
    /// or reordered, so this map is built once.
    positions: HashMap<RecordKey, usize>,
    index: TagIndex,
    undo_stack: Vec<Batch>,
    redo_stack: Vec<Batch>,
}

impl EditHistory {
    /// Take ownership of a record set.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::DuplicateRecordKey`] if two records share a key.
    pub fn new(records: Vec<Record>) -> Result<Self, TagError> {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if positions.insert(record.key, position).is_some() {
                return Err(TagError::DuplicateRecordKey(record.key));
            }
        }
        let index = TagIndex::build(&records);

        Ok(Self {
            records,
            positions,
            index,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        })
    }

    /// Apply a new batch and push its inverse onto the undo stack.
    ///
    /// Clears the redo stack. Returns `Ok(None)` for an empty batch, which
    /// changes nothing and leaves both stacks untouched.
    ///
    /// # Errors
    ///
    /// Rejects the whole batch, mutating nothing, when an action targets an
    /// unknown record ([`TagError::UnknownRecord`]) or when two actions target
    /// the same record ([`TagError::DuplicateEdit`]).
    pub fn apply(&mut self, batch: Batch) -> Result<Option<&[Record]>, TagError> {
        if batch.is_empty() {
            return Ok(None);
        }
        self.validate(&batch)?;

        let edits = batch.len();
        let inverse = self.swap_in(batch);
        self.undo_stack.push(inverse);
        self.redo_stack.clear();

        tracing::debug!(
            "Applied batch of {} edit(s); undo depth {}",
            edits,
            self.undo_stack.len()
        );
        Ok(Some(self.records.as_slice()))
    }

    /// Revert the most recent batch. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&[Record]> {
        let batch = self.undo_stack.pop()?;
        let captured = self.swap_in(batch);
        self.redo_stack.push(captured);

        tracing::debug!(
            "Undo: undo depth {}, redo depth {}",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Some(self.records.as_slice())
    }

    /// Re-apply the most recently undone batch. Returns `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<&[Record]> {
        let batch = self.redo_stack.pop()?;
        let captured = self.swap_in(batch);
        self.undo_stack.push(captured);

        tracing::debug!(
            "Redo: undo depth {}, redo depth {}",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Some(self.records.as_slice())
    }

    /// The live records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// An owned copy of the live records.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Look up a record by key.
    pub fn record(&self, key: RecordKey) -> Option<&Record> {
        self.positions.get(&key).map(|&position| &self.records[position])
    }

    /// The tag index, kept in sync with the records.
    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    /// The batch that the next [`undo`](Self::undo) would apply.
    pub fn last_edit(&self) -> Option<&Batch> {
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Give the records back, discarding the history.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn validate(&self, batch: &Batch) -> Result<(), TagError> {
        let mut seen = HashSet::with_capacity(batch.len());
        for key in batch.keys() {
            if !self.positions.contains_key(&key) {
                return Err(TagError::UnknownRecord(key));
            }
            if !seen.insert(key) {
                return Err(TagError::DuplicateEdit(key));
            }
        }
        Ok(())
    }

    /// Write each action's tags into its record and return the tags that
    /// were there before, as a batch in the same order.
    fn swap_in(&mut self, batch: Batch) -> Batch {
        let mut captured = Vec::with_capacity(batch.len());
        for action in batch {
            // Keys were validated when the batch first entered the history.
            let Some(&position) = self.positions.get(&action.key) else {
                continue;
            };
            let record = &mut self.records[position];
            let previous = std::mem::replace(&mut record.tags, action.tags);
            self.index
                .update_record(action.key, &previous, &record.tags);
            captured.push(EditAction {
                key: action.key,
                tags: previous,
            });
        }
        self.index.refresh_order(&self.records);
        Batch::from(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    fn create_test_history() -> EditHistory {
        EditHistory::new(vec![
            Record::new(7, "a.png", "/data/a.png", tags(&["a", "b"])),
            Record::new(3, "b.png", "/data/b.png", tags(&["b", "c"])),
            Record::new(5, "c.png", "/data/c.png", tags(&[])),
        ])
        .unwrap()
    }

    fn tag_lists(records: &[Record]) -> Vec<Vec<String>> {
        records.iter().map(|r| r.tags.clone()).collect()
    }

    #[test]
    fn test_apply_then_undo_restores_exactly() {
        let mut history = create_test_history();
        let before = history.snapshot();

        let batch = Batch::from(vec![
            EditAction::new(7, tags(&["b", "a", "z"])),
            EditAction::new(5, tags(&["q"])),
        ]);
        let after = history.apply(batch).unwrap().unwrap();
        assert_eq!(after[0].tags, tags(&["b", "a", "z"]));
        assert_eq!(after[2].tags, tags(&["q"]));

        history.undo().unwrap();
        assert_eq!(history.records(), before.as_slice());
    }

    #[test]
    fn test_redo_after_undo_reapplies() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![EditAction::new(3, tags(&["c"]))]))
            .unwrap();
        let applied = history.snapshot();

        history.undo();
        let redone = history.redo().unwrap();
        assert_eq!(redone, applied.as_slice());
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_batch_clears_redo() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![EditAction::new(7, tags(&["x"]))]))
            .unwrap();
        history.undo();
        assert!(history.can_redo());

        history
            .apply(Batch::from(vec![EditAction::new(3, tags(&["y"]))]))
            .unwrap();
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![EditAction::new(7, tags(&["x"]))]))
            .unwrap();
        history.undo();

        assert!(history.apply(Batch::new()).unwrap().is_none());
        // An empty batch does not count as a new edit.
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_undo_redo_on_empty_stacks() {
        let mut history = create_test_history();
        let before = history.snapshot();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.records(), before.as_slice());
    }

    #[test]
    fn test_unknown_key_rejects_whole_batch() {
        let mut history = create_test_history();
        let before = history.snapshot();

        let batch = Batch::from(vec![
            EditAction::new(7, tags(&["changed"])),
            EditAction::new(99, tags(&["x"])),
        ]);
        let err = history.apply(batch).unwrap_err();

        assert_eq!(err, TagError::UnknownRecord(RecordKey(99)));
        assert_eq!(history.records(), before.as_slice());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.index(), &TagIndex::build(&before));
    }

    #[test]
    fn test_duplicate_edit_rejected() {
        let mut history = create_test_history();
        let batch = Batch::from(vec![
            EditAction::new(7, tags(&["x"])),
            EditAction::new(7, tags(&["y"])),
        ]);
        assert_eq!(
            history.apply(batch).unwrap_err(),
            TagError::DuplicateEdit(RecordKey(7))
        );
        assert_eq!(history.record(RecordKey(7)).unwrap().tags, tags(&["a", "b"]));
    }

    #[test]
    fn test_duplicate_record_key_rejected() {
        let err = EditHistory::new(vec![
            Record::new(1, "a", "a", vec![]),
            Record::new(1, "b", "b", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, TagError::DuplicateRecordKey(RecordKey(1)));
    }

    #[test]
    fn test_last_edit_holds_inverse() {
        let mut history = create_test_history();
        assert!(history.last_edit().is_none());

        history
            .apply(Batch::from(vec![EditAction::new(3, tags(&["c", "b"]))]))
            .unwrap();
        let top = history.last_edit().unwrap();
        assert_eq!(top, &Batch::from(vec![EditAction::new(3, tags(&["b", "c"]))]));
    }

    #[test]
    fn test_keys_address_records_not_positions() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![EditAction::new(3, tags(&["only"]))]))
            .unwrap();
        assert_eq!(
            tag_lists(history.records()),
            vec![tags(&["a", "b"]), tags(&["only"]), tags(&[])]
        );
    }

    #[test]
    fn test_alternating_undo_redo_is_stable() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![
                EditAction::new(7, tags(&["b"])),
                EditAction::new(3, tags(&["c", "a", "b"])),
            ]))
            .unwrap();
        let applied = history.snapshot();
        let original = {
            let mut h = history.clone();
            h.undo();
            h.snapshot()
        };

        for _ in 0..5 {
            assert_eq!(history.undo().unwrap(), original.as_slice());
            assert_eq!(history.redo().unwrap(), applied.as_slice());
        }
        assert_eq!(history.index(), &TagIndex::build(history.records()));
    }

    #[test]
    fn test_index_follows_edits() {
        let mut history = create_test_history();
        history
            .apply(Batch::from(vec![
                EditAction::new(7, tags(&["z"])),
                EditAction::new(3, tags(&["z", "c"])),
            ]))
            .unwrap();

        assert_eq!(history.index().order(), ["z", "c"]);
        assert!(history.index().lookup("b").is_none());
        assert_eq!(history.index(), &TagIndex::build(history.records()));

        history.undo();
        assert_eq!(history.index().order(), ["a", "b", "c"]);
        assert_eq!(history.index(), &TagIndex::build(history.records()));
    }
}
