//! Error types for the orchestration layer.
//!
//! Run failures are tagged with the stage that failed (WBS load,
//! category resolution, element fetch, persistence) so a caller can
//! tell a broken schedule from a broken service.

use thiserror::Error;

use bwm_elements::ElementsError;
use bwm_wbs::WbsError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// No WBS set exists for the project/model, or the resolved set has
    /// zero rows.
    #[error("no WBS set to match against for project {0}")]
    NoWbsSet(String),

    #[error("WBS ingestion failed: {0}")]
    Ingest(#[from] WbsError),

    #[error("WBS load failed: {0}")]
    WbsLoad(#[source] StoreError),

    #[error("category resolution failed: {0}")]
    CategoryResolution(#[source] ElementsError),

    #[error("element fetch failed: {0}")]
    ElementFetch(#[source] ElementsError),

    #[error("persistence failed: {0}")]
    Persistence(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
