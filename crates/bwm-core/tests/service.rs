//! End-to-end orchestration tests over an in-memory store and a
//! scripted element source.

use serde_json::json;

use bwm_core::{CoreError, MatchService, MatchStore, MemoryStore, StoreError};
use bwm_elements::{ElementPage, ElementSource, ElementsError};
use bwm_model::{MatchStrategy, ModelId, ProjectId, RunId, WbsSetId};
use bwm_wbs::WbsRowInput;

struct FixedSource {
    results: Vec<serde_json::Value>,
}

impl ElementSource for FixedSource {
    fn fetch_page(
        &self,
        _model_id: &ModelId,
        _filter: &str,
        cursor: Option<&str>,
    ) -> Result<ElementPage, ElementsError> {
        assert!(cursor.is_none(), "single-page source");
        Ok(ElementPage {
            results: self.results.clone(),
            cursor: None,
        })
    }
}

fn project() -> ProjectId {
    ProjectId::new("P100").unwrap()
}

fn model() -> ModelId {
    ModelId::new("m-1").unwrap()
}

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

fn schedule_rows() -> Vec<WbsRowInput> {
    vec![row("3.2.1", "Foundation Pour"), row("3.5", "Interior Walls")]
}

fn element_source() -> FixedSource {
    FixedSource {
        results: vec![
            json!({"id": "e1", "properties": {"Assembly Code": "3.2.1"}}),
            json!({"id": "e2", "properties": {"Name": "Interior Wall Type A"}}),
        ],
    }
}

#[test]
fn run_matching_end_to_end() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);

    let saved = service
        .save_wbs_set(project(), Some(model()), "schedule.csv", &schedule_rows())
        .unwrap();
    assert_eq!(saved.rows_saved, 2);

    let summary = service.run_matching(&project(), &model(), None).unwrap();
    assert_eq!(summary.total_elements, 2);
    assert_eq!(summary.matched_elements, 2);
    assert_eq!(summary.unmatched_elements, 0);
    assert!(summary.latest_pointer_updated);

    let run = service
        .get_latest_match_run(&project(), &model())
        .unwrap()
        .expect("latest run");
    assert_eq!(run.run_id, summary.run_id);

    let exact = &run.results[0];
    assert_eq!(exact.item_key, "000000");
    assert_eq!(exact.element_id, "e1");
    assert_eq!(exact.strategy, MatchStrategy::AssemblyCodeExact);
    assert_eq!(exact.confidence, 1.0);
    assert_eq!(exact.matched_wbs_code.as_deref(), Some("3.2.1"));
    assert_eq!(exact.matched_wbs_title.as_deref(), Some("Foundation Pour"));

    let text = &run.results[1];
    assert_eq!(text.item_key, "000001");
    assert_eq!(text.strategy, MatchStrategy::DescriptionSimilarity);
    assert_eq!(text.matched_wbs_code.as_deref(), Some("3.5"));
    // "interior" overlaps half of {interior, walls}: coverage 0.5.
    assert_eq!(text.confidence, 0.5);

    // Mean over matched elements: (1.0 + 0.5) / 2.
    assert_eq!(run.average_confidence, 0.75);
    assert_eq!(summary.average_confidence, 0.75);
}

#[test]
fn rerun_creates_a_new_immutable_run() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);
    service
        .save_wbs_set(project(), Some(model()), "s", &schedule_rows())
        .unwrap();

    let first = service.run_matching(&project(), &model(), None).unwrap();
    let second = service.run_matching(&project(), &model(), None).unwrap();
    assert_ne!(first.run_id, second.run_id);

    // Both runs remain retrievable; the latest pointer moved on.
    assert!(store.get_run(&first.run_id).unwrap().is_some());
    let latest = service
        .get_latest_match_run(&project(), &model())
        .unwrap()
        .unwrap();
    assert_eq!(latest.run_id, second.run_id);
}

#[test]
fn explicit_set_id_overrides_latest() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);

    let older = service
        .save_wbs_set(project(), Some(model()), "old", &schedule_rows())
        .unwrap();
    let _newer = service
        .save_wbs_set(
            project(),
            Some(model()),
            "new",
            &[row("9", "Unrelated Scope")],
        )
        .unwrap();

    let summary = service
        .run_matching(&project(), &model(), Some(&older.wbs_set_id))
        .unwrap();
    assert_eq!(summary.wbs_set_id, older.wbs_set_id);
    assert_eq!(summary.matched_elements, 2);
}

#[test]
fn missing_set_fails_with_no_wbs_set() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);

    let result = service.run_matching(&project(), &model(), None);
    assert!(matches!(result, Err(CoreError::NoWbsSet(_))));
}

#[test]
fn empty_set_fails_with_no_wbs_set() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);
    service
        .save_wbs_set(project(), Some(model()), "empty", &[])
        .unwrap();

    let result = service.run_matching(&project(), &model(), None);
    assert!(matches!(result, Err(CoreError::NoWbsSet(_))));
}

#[test]
fn latest_run_is_none_before_any_run() {
    let store = MemoryStore::new();
    let source = element_source();
    let service = MatchService::new(&store, &source);
    service
        .save_wbs_set(project(), Some(model()), "s", &schedule_rows())
        .unwrap();

    assert!(
        service
            .get_latest_match_run(&project(), &model())
            .unwrap()
            .is_none()
    );
}

/// Store whose latest-run pointer update always fails, to exercise the
/// degraded-but-successful path.
struct BrokenPointerStore {
    inner: MemoryStore,
}

impl MatchStore for BrokenPointerStore {
    fn save_set(&self, set: &bwm_model::WbsSet) -> Result<(), StoreError> {
        self.inner.save_set(set)
    }
    fn get_set(&self, id: &WbsSetId) -> Result<Option<bwm_model::WbsSet>, StoreError> {
        self.inner.get_set(id)
    }
    fn latest_set(
        &self,
        project: &ProjectId,
        model: Option<&ModelId>,
    ) -> Result<Option<bwm_model::WbsSet>, StoreError> {
        self.inner.latest_set(project, model)
    }
    fn items(&self, id: &WbsSetId) -> Result<Option<Vec<bwm_model::WbsItem>>, StoreError> {
        self.inner.items(id)
    }
    fn save_run(&self, run: &bwm_model::MatchRun) -> Result<(), StoreError> {
        self.inner.save_run(run)
    }
    fn get_run(&self, id: &RunId) -> Result<Option<bwm_model::MatchRun>, StoreError> {
        self.inner.get_run(id)
    }
    fn update_set_latest_run(&self, _: &WbsSetId, _: &RunId) -> Result<(), StoreError> {
        Err(StoreError::NotFound("pointer table offline".to_string()))
    }
    fn list_sets(&self, project: Option<&ProjectId>) -> Result<Vec<bwm_model::WbsSet>, StoreError> {
        self.inner.list_sets(project)
    }
}

#[test]
fn pointer_update_failure_is_degraded_success() {
    let store = BrokenPointerStore {
        inner: MemoryStore::new(),
    };
    let source = element_source();
    let service = MatchService::new(&store, &source);
    service
        .save_wbs_set(project(), Some(model()), "s", &schedule_rows())
        .unwrap();

    let summary = service.run_matching(&project(), &model(), None).unwrap();
    assert!(!summary.latest_pointer_updated);
    // The run itself is retrievable by id.
    assert!(store.get_run(&summary.run_id).unwrap().is_some());
    // But it is not reachable as "latest".
    assert!(
        service
            .get_latest_match_run(&project(), &model())
            .unwrap()
            .is_none()
    );
}
