//! WBS schedule snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::code::WbsCode;
use crate::ids::{ModelId, ProjectId, RunId, WbsSetId};

/// One schedule activity within a WBS set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbsItem {
    pub code: WbsCode,
    pub title: String,
    /// Number of dot-separated segments in `code` (1–8).
    pub level: usize,
    /// Parent code, empty for top-level items.
    pub parent_code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_cost: Option<f64>,
    pub progress_pct: Option<f64>,
}

impl WbsItem {
    /// Builds an item from a validated code and title, deriving level and
    /// parent code.
    pub fn new(code: WbsCode, title: impl Into<String>) -> Self {
        let level = code.level();
        let parent_code = code.parent_str();
        Self {
            code,
            title: title.into(),
            level,
            parent_code,
            start_date: None,
            end_date: None,
            budget_cost: None,
            progress_pct: None,
        }
    }
}

/// An immutable, timestamped snapshot of WBS items for one
/// (project, model) pair.
///
/// `latest_run_id` is a non-owning back-reference to the most recent
/// matching run produced against this set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbsSet {
    pub id: WbsSetId,
    pub project_id: ProjectId,
    pub model_id: Option<ModelId>,
    pub source_name: String,
    pub created_at: DateTime<Utc>,
    pub latest_run_id: Option<RunId>,
    pub items: Vec<WbsItem>,
}

impl WbsSet {
    pub fn row_count(&self) -> usize {
        self.items.len()
    }
}
