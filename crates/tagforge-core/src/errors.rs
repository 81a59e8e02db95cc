//! Error types for tagforge-core.
//!
//! Degenerate requests (empty tag lists, undo on an empty stack, offsets past
//! the end of a tag list) are not errors; they resolve to no-ops. The variants
//! below are caller contract violations only.

use thiserror::Error;

use crate::types::RecordKey;

/// Domain-specific errors for tag editing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// An edit action addresses a record key that is not in the record set.
    ///
    /// The whole batch is rejected and nothing is mutated.
    #[error("Edit targets unknown record `{0}`.")]
    UnknownRecord(RecordKey),

    /// A batch contains more than one edit action for the same record.
    #[error("Batch contains more than one edit for record `{0}`.")]
    DuplicateEdit(RecordKey),

    /// The initial record set contains two records with the same key.
    #[error("Record key `{0}` is used by more than one record.")]
    DuplicateRecordKey(RecordKey),

    /// Invalid argument provided to an operation.
    #[error("{0}")]
    InvalidArgument(String),
}
