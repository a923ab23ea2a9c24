//! Match-run orchestration.
//!
//! One service instance wires a store and an element source together
//! and exposes the engine's public operations. Every run is computed
//! from scratch against a freshly loaded set and freshly fetched
//! elements; no state is shared across invocations.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use bwm_elements::{
    CategoryResolution, ElementSource, all_elements_filter, fetch_model_elements,
    resolve_category_elements,
};
use bwm_match::MatchEngine;
use bwm_model::{
    MatchResult, MatchRun, ModelElement, ModelId, ProjectId, RunId, WbsSet, WbsSetId,
};
use bwm_wbs::{WbsRowInput, build_set};

use crate::error::{CoreError, Result};
use crate::store::MatchStore;

/// Outcome of persisting a WBS batch.
#[derive(Debug, Clone, Serialize)]
pub struct SavedSet {
    pub wbs_set_id: WbsSetId,
    pub rows_saved: usize,
}

/// Run-level aggregates returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub wbs_set_id: WbsSetId,
    pub total_elements: usize,
    pub matched_elements: usize,
    pub unmatched_elements: usize,
    pub average_confidence: f64,
    /// False when the run was saved but the owning set's latest-run
    /// back-reference could not be updated. The run is still
    /// retrievable by id.
    pub latest_pointer_updated: bool,
}

/// The engine's public surface, over an injected store and source.
pub struct MatchService<'a> {
    store: &'a dyn MatchStore,
    source: &'a dyn ElementSource,
}

impl<'a> MatchService<'a> {
    pub fn new(store: &'a dyn MatchStore, source: &'a dyn ElementSource) -> Self {
        Self { store, source }
    }

    /// Validates and persists a WBS batch as a new immutable set.
    pub fn save_wbs_set(
        &self,
        project_id: ProjectId,
        model_id: Option<ModelId>,
        source_name: &str,
        rows: &[WbsRowInput],
    ) -> Result<SavedSet> {
        let set = build_set(project_id, model_id, source_name, rows)?;
        self.store.save_set(&set).map_err(CoreError::Persistence)?;
        info!(set = %set.id, rows = set.row_count(), "WBS set saved");
        Ok(SavedSet {
            rows_saved: set.row_count(),
            wbs_set_id: set.id,
        })
    }

    /// Resolves a category label to its elements.
    pub fn resolve_category_elements(
        &self,
        model_id: &ModelId,
        label: &str,
    ) -> Result<CategoryResolution> {
        resolve_category_elements(self.source, model_id, label)
            .map_err(CoreError::CategoryResolution)
    }

    /// Fetches every element of the model, bypassing category
    /// resolution.
    pub fn fetch_all_elements(&self, model_id: &ModelId) -> Result<Vec<ModelElement>> {
        fetch_model_elements(self.source, model_id, &all_elements_filter())
            .map_err(CoreError::ElementFetch)
    }

    /// Runs the matching algorithm over every element of the model.
    ///
    /// The target set is the explicit `wbs_set_id` when given, otherwise
    /// the latest set for the (project, model) pair. Output row order is
    /// element input order.
    pub fn run_matching(
        &self,
        project_id: &ProjectId,
        model_id: &ModelId,
        wbs_set_id: Option<&WbsSetId>,
    ) -> Result<RunSummary> {
        let set = self.resolve_target_set(project_id, model_id, wbs_set_id)?;
        let elements = self.fetch_all_elements(model_id)?;

        let engine = MatchEngine::new(set.items.clone());
        let mut results = Vec::with_capacity(elements.len());
        let mut matched = 0_usize;
        let mut confidence_sum = 0.0_f64;
        for (index, element) in elements.iter().enumerate() {
            let outcome = engine.match_element(element);
            if outcome.strategy.is_matched() {
                matched += 1;
                confidence_sum += outcome.confidence;
            }
            results.push(MatchResult {
                item_key: format!("{index:06}"),
                element_id: element.element_id.clone(),
                assembly_code: element.assembly_code.clone(),
                matched_wbs_code: outcome.wbs_code.map(|c| c.as_str().to_string()),
                matched_wbs_title: outcome.wbs_title,
                confidence: outcome.confidence,
                strategy: outcome.strategy,
            });
        }

        let total = results.len();
        let average_confidence = if matched == 0 {
            0.0
        } else {
            (confidence_sum / matched as f64 * 10_000.0).round() / 10_000.0
        };
        let run = MatchRun {
            run_id: RunId::generate(),
            wbs_set_id: set.id.clone(),
            project_id: project_id.clone(),
            model_id: model_id.clone(),
            created_at: Utc::now(),
            total_elements: total,
            matched_elements: matched,
            unmatched_elements: total - matched,
            average_confidence,
            results,
        };

        self.store.save_run(&run).map_err(CoreError::Persistence)?;
        // Best-effort back-reference: a failure here leaves the run
        // retrievable by id but not yet "latest", which is an
        // acceptable degraded state rather than a failed run.
        let latest_pointer_updated = match self.store.update_set_latest_run(&set.id, &run.run_id) {
            Ok(()) => true,
            Err(error) => {
                warn!(set = %set.id, run = %run.run_id, %error,
                    "run saved but latest-run pointer not updated");
                false
            }
        };

        info!(
            run = %run.run_id,
            total,
            matched,
            unmatched = total - matched,
            "matching run complete"
        );
        Ok(RunSummary {
            run_id: run.run_id,
            wbs_set_id: run.wbs_set_id,
            total_elements: total,
            matched_elements: matched,
            unmatched_elements: total - matched,
            average_confidence,
            latest_pointer_updated,
        })
    }

    /// Most recent run for the project/model, if any.
    pub fn get_latest_match_run(
        &self,
        project_id: &ProjectId,
        model_id: &ModelId,
    ) -> Result<Option<MatchRun>> {
        let Some(set) = self
            .store
            .latest_set(project_id, Some(model_id))
            .map_err(CoreError::WbsLoad)?
        else {
            return Ok(None);
        };
        let Some(run_id) = set.latest_run_id else {
            return Ok(None);
        };
        self.store.get_run(&run_id).map_err(CoreError::WbsLoad)
    }

    fn resolve_target_set(
        &self,
        project_id: &ProjectId,
        model_id: &ModelId,
        wbs_set_id: Option<&WbsSetId>,
    ) -> Result<WbsSet> {
        let set = match wbs_set_id {
            Some(id) => self.store.get_set(id).map_err(CoreError::WbsLoad)?,
            None => self
                .store
                .latest_set(project_id, Some(model_id))
                .map_err(CoreError::WbsLoad)?,
        };
        match set {
            Some(set) if set.row_count() > 0 => Ok(set),
            _ => Err(CoreError::NoWbsSet(project_id.as_str().to_string())),
        }
    }
}
