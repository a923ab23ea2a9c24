//! Whole-batch WBS ingestion.
//!
//! A submitted batch either becomes a complete [`WbsSet`] or is rejected
//! as a unit: the first invalid row or duplicate code fails the call and
//! nothing is kept. Partial ingestion would leave a schedule that looks
//! valid but silently lost rows.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bwm_model::{ModelId, ProjectId, WbsCode, WbsItem, WbsSet, WbsSetId};

use crate::error::{Result, WbsError};

/// Deepest hierarchy level accepted at ingestion.
pub const MAX_LEVEL: usize = 8;

/// One submitted schedule row, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbsRowInput {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget_cost: Option<f64>,
    #[serde(default)]
    pub progress_pct: Option<f64>,
}

/// Validates a batch of rows and builds an immutable [`WbsSet`].
///
/// Rows are kept in submitted order. An empty batch produces an empty
/// set; matching against it will fail later with a no-schedule error
/// rather than here.
///
/// # Errors
///
/// [`WbsError::InvalidRow`] for the first row whose code fails the
/// grammar, whose level exceeds [`MAX_LEVEL`], or whose title is empty;
/// [`WbsError::DuplicateCode`] when two rows normalize to the same code.
pub fn build_set(
    project_id: ProjectId,
    model_id: Option<ModelId>,
    source_name: &str,
    rows: &[WbsRowInput],
) -> Result<WbsSet> {
    let mut items = Vec::with_capacity(rows.len());
    let mut seen = std::collections::BTreeSet::new();

    for (index, row) in rows.iter().enumerate() {
        let code = WbsCode::try_normalize(&row.code).ok_or_else(|| WbsError::InvalidRow {
            row: index,
            code: row.code.clone(),
            reason: "code must be dot-separated digits".to_string(),
        })?;
        if code.level() > MAX_LEVEL {
            return Err(WbsError::InvalidRow {
                row: index,
                code: row.code.clone(),
                reason: format!("level {} exceeds maximum {MAX_LEVEL}", code.level()),
            });
        }
        let title = row.title.trim();
        if title.is_empty() {
            return Err(WbsError::InvalidRow {
                row: index,
                code: row.code.clone(),
                reason: "title must not be empty".to_string(),
            });
        }
        if !seen.insert(code.as_str().to_string()) {
            return Err(WbsError::DuplicateCode(code.as_str().to_string()));
        }

        let mut item = WbsItem::new(code, title);
        item.start_date = row.start_date;
        item.end_date = row.end_date;
        item.budget_cost = row.budget_cost;
        item.progress_pct = row.progress_pct;
        items.push(item);
    }

    debug!(rows = items.len(), source = source_name, "built WBS set");

    Ok(WbsSet {
        id: WbsSetId::generate(),
        project_id,
        model_id,
        source_name: source_name.to_string(),
        created_at: Utc::now(),
        latest_run_id: None,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, title: &str) -> WbsRowInput {
        WbsRowInput {
            code: code.to_string(),
            title: title.to_string(),
            start_date: None,
            end_date: None,
            budget_cost: None,
            progress_pct: None,
        }
    }

    fn project() -> ProjectId {
        ProjectId::new("P100").unwrap()
    }

    #[test]
    fn builds_set_with_derived_levels() {
        let rows = vec![row("3", "Concrete"), row("3.2.1", "Foundation Pour")];
        let set = build_set(project(), None, "schedule.csv", &rows).unwrap();
        assert_eq!(set.row_count(), 2);
        assert_eq!(set.items[1].level, 3);
        assert_eq!(set.items[1].parent_code, "3.2");
        assert!(set.latest_run_id.is_none());
    }

    #[test]
    fn rejects_whole_batch_on_invalid_code() {
        let rows = vec![row("3.2", "Ok"), row("3.x", "Bad")];
        let err = build_set(project(), None, "s", &rows).unwrap_err();
        match err {
            WbsError::InvalidRow { row, code, .. } => {
                assert_eq!(row, 1);
                assert_eq!(code, "3.x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_title() {
        let rows = vec![row("3.2", "  ")];
        assert!(matches!(
            build_set(project(), None, "s", &rows),
            Err(WbsError::InvalidRow { .. })
        ));
    }

    #[test]
    fn rejects_level_beyond_maximum() {
        let rows = vec![row("1.2.3.4.5.6.7.8.9", "Too deep")];
        assert!(matches!(
            build_set(project(), None, "s", &rows),
            Err(WbsError::InvalidRow { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_normalized_codes() {
        // "3.2." canonicalizes to "3.2", colliding with the first row.
        let rows = vec![row("3.2", "A"), row("3.2.", "B")];
        let err = build_set(project(), None, "s", &rows).unwrap_err();
        assert!(matches!(err, WbsError::DuplicateCode(code) if code == "3.2"));
    }

    #[test]
    fn empty_batch_builds_empty_set() {
        let set = build_set(project(), None, "s", &[]).unwrap();
        assert_eq!(set.row_count(), 0);
    }
}
