//! # tagforge-core
//!
//! **Tag curation kernel** – bulk tag edits with undo/redo.
//!
//! This crate holds the pure editing logic for datasets of tagged media
//! records. It performs no file, process or network I/O and is consumed by the
//! `tagforge` CLI.
//!
//! ## Main Types
//!
//! - [`TagEditor`] – the entry point: plan, apply, undo and redo bulk edits
//! - [`EditHistory`] – record set plus undo/redo stacks of inverse batches
//! - [`TagIndex`] – tag → record keys, kept in sync with the records
//! - [`TagError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`tagset`] – order-preserving set operations over tag lists
//! - [`planner`] – turns insert/delete/replace requests into batches
//! - [`index`] – the tag membership index
//! - [`history`] – batch application and undo/redo
//! - [`editor`] – the [`TagEditor`] facade
//! - [`sidecar`] – sidecar tag text parsing and formatting
//! - [`types`] – records, edit actions and request types
//!
//! ## Example
//!
//! ```
//! use tagforge_core::{Record, TagEditor};
//!
//! let records = vec![
//!     Record::new(0, "a.png", "/data/a.png", vec!["cat".into()]),
//!     Record::new(1, "b.png", "/data/b.png", vec!["dog".into(), "cat".into()]),
//! ];
//! let mut editor = TagEditor::new(records)?;
//!
//! editor.replace(&["cat"], &["feline"])?;
//! assert_eq!(editor.tags(), ["feline", "dog"]);
//!
//! editor.undo();
//! assert_eq!(editor.tags(), ["cat", "dog"]);
//! # Ok::<(), tagforge_core::TagError>(())
//! ```

// Modules
pub mod editor;
pub mod errors;
pub mod history;
pub mod index;
pub mod planner;
pub mod sidecar;
pub mod tagset;
pub mod types;

// Re-exports for convenience
pub use editor::TagEditor;
pub use errors::TagError;
pub use history::EditHistory;
pub use index::TagIndex;
pub use planner::{plan, plan_delete, plan_insert, plan_replace};
pub use sidecar::{format_tags, parse_tags};
pub use tagset::{collect_tags, dedupe, difference};
pub use types::{
    Batch, EditAction, FilterMode, InsertPosition, Record, RecordKey, TagOperation,
};
