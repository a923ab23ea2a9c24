//! Error types for WBS ingestion.

use thiserror::Error;

/// Ingestion failures. Any failure rejects the whole submitted batch;
/// no rows are kept from a batch that contains an invalid row.
#[derive(Debug, Error)]
pub enum WbsError {
    /// A row failed validation. Carries the first offending row so the
    /// caller can fix and resubmit.
    #[error("invalid WBS row {row}: {reason} (code {code:?})")]
    InvalidRow {
        /// Zero-based index of the offending row in the submitted batch.
        row: usize,
        code: String,
        reason: String,
    },

    /// Two rows in the same batch normalize to the same code.
    #[error("duplicate WBS code in batch: {0}")]
    DuplicateCode(String),
}

pub type Result<T> = std::result::Result<T, WbsError>;
