//! Order-preserving set operations over tag lists.

use std::collections::HashSet;

use crate::types::Record;

/// Remove duplicates and empty strings, keeping the first occurrence order.
pub fn dedupe<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(tags.len());
    tags.iter()
        .map(|tag| tag.as_ref())
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

/// Keep the entries of `tags` that are not in `exclude`, in order.
pub fn difference<S: AsRef<str>, E: AsRef<str>>(tags: &[S], exclude: &[E]) -> Vec<String> {
    let excluded: HashSet<&str> = exclude.iter().map(|tag| tag.as_ref()).collect();
    tags.iter()
        .map(|tag| tag.as_ref())
        .filter(|tag| !excluded.contains(*tag))
        .map(str::to_string)
        .collect()
}

/// Distinct tags across all records, in first-seen order.
pub fn collect_tags(records: &[Record]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .flat_map(|record| record.tags.iter())
        .map(String::as_str)
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(str::to_string)
        .collect()
}
