//! Tag membership index.
//!
//! Maps each tag to the set of records carrying it:
//! - Tag → record keys, for O(1) average lookup
//! - First-seen tag order across the record sequence, for display
//!
//! The edit history keeps one index in sync with its records; a fresh
//! [`TagIndex::build`] over the same records always compares equal to it.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::tagset::{collect_tags, dedupe};
use crate::types::{FilterMode, Record, RecordKey};

/// Inverted index from tag name to record keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    /// Tag → keys of the records carrying it. Never holds an empty set.
    membership: HashMap<String, BTreeSet<RecordKey>>,
    /// Distinct tags in first-seen order (records in sequence, tags in list order).
    order: Vec<String>,
}

impl TagIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index in one pass over the records.
    pub fn build(records: &[Record]) -> Self {
        let mut index = Self::new();
        for record in records {
            for tag in record.tags.iter().filter(|tag| !tag.is_empty()) {
                let keys = index.membership.entry(tag.clone()).or_default();
                if keys.is_empty() {
                    index.order.push(tag.clone());
                }
                keys.insert(record.key);
            }
        }
        index
    }

    /// Keys of the records carrying `tag`.
    pub fn lookup(&self, tag: &str) -> Option<&BTreeSet<RecordKey>> {
        self.membership.get(tag)
    }

    /// Number of records carrying `tag`.
    pub fn count(&self, tag: &str) -> usize {
        self.membership.get(tag).map(BTreeSet::len).unwrap_or(0)
    }

    /// Check if any record carries `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.membership.contains_key(tag)
    }

    /// Distinct tags in first-seen order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no record carries any tag.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tags with their record counts, in first-seen order.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.order
            .iter()
            .map(|tag| (tag.as_str(), self.count(tag)))
            .collect()
    }

    /// Union of the records carrying any of `tags`.
    pub fn keys_for_any<S: AsRef<str>>(&self, tags: &[S]) -> BTreeSet<RecordKey> {
        tags.iter()
            .filter_map(|tag| self.membership.get(tag.as_ref()))
            .flatten()
            .copied()
            .collect()
    }

    /// Records selected by a tag filter, in record order.
    ///
    /// An empty tag list selects every record regardless of `mode`.
    pub fn filter<S: AsRef<str>>(
        &self,
        records: &[Record],
        tags: &[S],
        mode: FilterMode,
    ) -> Vec<RecordKey> {
        let tags = dedupe(tags);
        if tags.is_empty() {
            return records.iter().map(|record| record.key).collect();
        }

        let selected: BTreeSet<RecordKey> = match mode {
            FilterMode::IncludeAny | FilterMode::Exclude => self.keys_for_any(&tags),
            FilterMode::IncludeAll => self.keys_for_all(&tags),
        };
        let keep = |key: &RecordKey| match mode {
            FilterMode::Exclude => !selected.contains(key),
            FilterMode::IncludeAny | FilterMode::IncludeAll => selected.contains(key),
        };

        records
            .iter()
            .map(|record| record.key)
            .filter(|key| keep(key))
            .collect()
    }

    fn keys_for_all(&self, tags: &[String]) -> BTreeSet<RecordKey> {
        let mut sets = Vec::with_capacity(tags.len());
        for tag in tags {
            match self.membership.get(tag) {
                Some(keys) => sets.push(keys),
                None => return BTreeSet::new(),
            }
        }
        // Intersect starting from the smallest set.
        sets.sort_by_key(|keys| keys.len());
        let Some((first, rest)) = sets.split_first() else {
            return BTreeSet::new();
        };
        first
            .iter()
            .filter(|key| rest.iter().all(|keys| keys.contains(*key)))
            .copied()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Incremental maintenance (driven by the edit history)
    // -------------------------------------------------------------------------

    /// Patch membership after one record's tags changed from `old` to `new`.
    pub(crate) fn update_record(&mut self, key: RecordKey, old: &[String], new: &[String]) {
        let kept: HashSet<&str> = new.iter().map(String::as_str).collect();
        for tag in old.iter().filter(|tag| !kept.contains(tag.as_str())) {
            if let Some(keys) = self.membership.get_mut(tag) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.membership.remove(tag);
                }
            }
        }
        for tag in new.iter().filter(|tag| !tag.is_empty()) {
            self.membership.entry(tag.clone()).or_default().insert(key);
        }
    }

    /// Re-derive the first-seen order once a batch has been applied.
    pub(crate) fn refresh_order(&mut self, records: &[Record]) {
        self.order = collect_tags(records);
        debug_assert_eq!(self.order.len(), self.membership.len());
    }
}
