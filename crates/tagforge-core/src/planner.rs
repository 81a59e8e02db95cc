//! Bulk-edit planner.
//!
//! Turns a bulk tag operation into the [`Batch`] of per-record edits that
//! realizes it. Planning never mutates the records; the batch is handed to
//! the edit history which applies it and records the inverse.
//!
//! Every planner emits actions in record-sequence order and at most one
//! action per record.

use std::collections::{HashMap, HashSet};

use crate::index::TagIndex;
use crate::tagset::{dedupe, difference};
use crate::types::{Batch, EditAction, InsertPosition, Record, TagOperation};

/// Plan the batch for any [`TagOperation`].
pub fn plan(records: &[Record], index: &TagIndex, operation: &TagOperation) -> Batch {
    match operation {
        TagOperation::Insert { tags, position } => plan_insert(records, tags, *position),
        TagOperation::Delete { tags } => plan_delete(records, index, tags),
        TagOperation::Replace { from, to } => plan_replace(records, from, to),
    }
}

/// Insert `tags` into every record.
///
/// Existing occurrences of the inserted tags are removed from each record
/// first, so reinserting a tag moves it instead of duplicating it. The rest
/// of the list is deduplicated as well. Every record gets an action; an
/// empty (or all-empty) tag list yields an empty batch.
pub fn plan_insert<S: AsRef<str>>(
    records: &[Record],
    tags: &[S],
    position: InsertPosition,
) -> Batch {
    let tags = dedupe(tags);
    if tags.is_empty() {
        tracing::debug!("Insert requested with no tags; nothing to plan");
        return Batch::new();
    }

    let batch: Batch = records
        .iter()
        .map(|record| {
            let mut remaining = dedupe(&difference(&record.tags, &tags));
            let at = splice_offset(remaining.len(), position);
            remaining.splice(at..at, tags.iter().cloned());
            EditAction {
                key: record.key,
                tags: remaining,
            }
        })
        .collect();

    tracing::debug!(
        "Planned insert of {} tag(s) at {}: {} edit(s)",
        tags.len(),
        position,
        batch.len()
    );
    batch
}

/// Remove `tags` from every record carrying at least one of them.
///
/// Candidate records come from the tag index; records whose tag list would
/// not shrink are left out of the batch.
pub fn plan_delete<S: AsRef<str>>(records: &[Record], index: &TagIndex, tags: &[S]) -> Batch {
    let tags = dedupe(tags);
    if tags.is_empty() {
        return Batch::new();
    }

    let candidates = index.keys_for_any(&tags);
    if candidates.is_empty() {
        tracing::debug!("Delete of {:?} matches no records", tags);
        return Batch::new();
    }

    let batch = strip_tags(
        records
            .iter()
            .filter(|record| candidates.contains(&record.key)),
        &tags,
    );
    tracing::debug!(
        "Planned delete of {} tag(s): {} edit(s)",
        tags.len(),
        batch.len()
    );
    batch
}

/// Rename or merge tags.
///
/// `from[i]` maps to `to[i]`. Surplus `from` entries map to nothing (they are
/// deleted); when `to` is longer, the last `from` entry maps to every
/// remaining `to` entry. Replacements happen in place and the resulting list
/// is deduplicated. An empty `to` behaves like [`plan_delete`].
pub fn plan_replace<F: AsRef<str>, T: AsRef<str>>(
    records: &[Record],
    from: &[F],
    to: &[T],
) -> Batch {
    let from = dedupe(from);
    let to = dedupe(to);
    if from.is_empty() {
        tracing::debug!("Replace requested with no source tags; nothing to plan");
        return Batch::new();
    }
    if to.is_empty() {
        return strip_tags(records.iter(), &from);
    }

    let mapping = replacement_map(&from, &to);
    let batch: Batch = records
        .iter()
        .filter_map(|record| {
            let mut touched = false;
            let mut replaced = Vec::with_capacity(record.tags.len() + to.len());
            for tag in &record.tags {
                match mapping.get(tag.as_str()) {
                    Some(targets) => {
                        touched = true;
                        replaced.extend(targets.iter().cloned());
                    }
                    None => replaced.push(tag.clone()),
                }
            }
            if !touched {
                return None;
            }
            let replaced = dedupe(&replaced);
            (replaced != record.tags).then(|| EditAction {
                key: record.key,
                tags: replaced,
            })
        })
        .collect();

    tracing::debug!(
        "Planned replace {:?} -> {:?}: {} edit(s)",
        from,
        to,
        batch.len()
    );
    batch
}

/// Where to splice inserted tags into a list of `len` tags.
fn splice_offset(len: usize, position: InsertPosition) -> usize {
    match position {
        InsertPosition::Auto => len,
        InsertPosition::Offset(offset) if offset >= 0 => offset.unsigned_abs().min(len),
        InsertPosition::Offset(offset) => len.saturating_sub(offset.unsigned_abs()),
    }
}

/// Source tag → replacement tags. The surplus of a longer `to` attaches to
/// the last source tag.
fn replacement_map<'a>(from: &'a [String], to: &'a [String]) -> HashMap<&'a str, &'a [String]> {
    let paired = from.len().min(to.len());
    let mut mapping: HashMap<&str, &[String]> = from
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let targets: &[String] = if i < paired { &to[i..=i] } else { &[] };
            (source.as_str(), targets)
        })
        .collect();

    if to.len() > from.len() {
        let last = from.len() - 1;
        mapping.insert(from[last].as_str(), &to[last..]);
    }
    mapping
}

/// Drop `tags` from each record that carries at least one of them. The kept
/// tags are deduplicated.
fn strip_tags<'a>(records: impl Iterator<Item = &'a Record>, tags: &[String]) -> Batch {
    let doomed: HashSet<&str> = tags.iter().map(String::as_str).collect();
    records
        .filter(|record| record.tags.iter().any(|tag| doomed.contains(tag.as_str())))
        .map(|record| EditAction {
            key: record.key,
            tags: dedupe(&difference(&record.tags, tags)),
        })
        .collect()
}
