//! Persistence seam for WBS sets and match runs.
//!
//! The engine consumes storage through [`MatchStore`]: load/save/query
//! by exact key, no secondary indices assumed. Two implementations are
//! provided, a JSON-file store for the CLI and an in-memory store for
//! tests and embedders. Consistency across concurrent writers is the
//! store's problem, not the engine's; the engine never serializes
//! overlapping runs against each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use bwm_model::{MatchRun, ModelId, ProjectId, RunId, WbsItem, WbsSet, WbsSetId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage operations required by the engine, by exact key only.
pub trait MatchStore {
    fn save_set(&self, set: &WbsSet) -> StoreResult<()>;
    fn get_set(&self, id: &WbsSetId) -> StoreResult<Option<WbsSet>>;
    /// Most recent set for a project by creation timestamp, optionally
    /// restricted to one model.
    fn latest_set(&self, project: &ProjectId, model: Option<&ModelId>)
    -> StoreResult<Option<WbsSet>>;
    fn items(&self, id: &WbsSetId) -> StoreResult<Option<Vec<WbsItem>>>;
    fn save_run(&self, run: &MatchRun) -> StoreResult<()>;
    fn get_run(&self, id: &RunId) -> StoreResult<Option<MatchRun>>;
    /// Points a set's latest-run back-reference at `run_id`.
    fn update_set_latest_run(&self, set_id: &WbsSetId, run_id: &RunId) -> StoreResult<()>;
    /// All sets, newest first, optionally restricted to one project.
    fn list_sets(&self, project: Option<&ProjectId>) -> StoreResult<Vec<WbsSet>>;
}

/// In-memory store for tests and embedders.
#[derive(Default)]
pub struct MemoryStore {
    sets: Mutex<BTreeMap<String, WbsSet>>,
    runs: Mutex<BTreeMap<String, MatchRun>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryStore {
    fn save_set(&self, set: &WbsSet) -> StoreResult<()> {
        self.sets
            .lock()
            .expect("store lock")
            .insert(set.id.as_str().to_string(), set.clone());
        Ok(())
    }

    fn get_set(&self, id: &WbsSetId) -> StoreResult<Option<WbsSet>> {
        Ok(self.sets.lock().expect("store lock").get(id.as_str()).cloned())
    }

    fn latest_set(
        &self,
        project: &ProjectId,
        model: Option<&ModelId>,
    ) -> StoreResult<Option<WbsSet>> {
        let sets = self.sets.lock().expect("store lock");
        Ok(sets
            .values()
            .filter(|set| &set.project_id == project)
            .filter(|set| model.is_none() || set.model_id.as_ref() == model)
            .max_by_key(|set| set.created_at)
            .cloned())
    }

    fn items(&self, id: &WbsSetId) -> StoreResult<Option<Vec<WbsItem>>> {
        Ok(self
            .sets
            .lock()
            .expect("store lock")
            .get(id.as_str())
            .map(|set| set.items.clone()))
    }

    fn save_run(&self, run: &MatchRun) -> StoreResult<()> {
        self.runs
            .lock()
            .expect("store lock")
            .insert(run.run_id.as_str().to_string(), run.clone());
        Ok(())
    }

    fn get_run(&self, id: &RunId) -> StoreResult<Option<MatchRun>> {
        Ok(self.runs.lock().expect("store lock").get(id.as_str()).cloned())
    }

    fn update_set_latest_run(&self, set_id: &WbsSetId, run_id: &RunId) -> StoreResult<()> {
        let mut sets = self.sets.lock().expect("store lock");
        let set = sets
            .get_mut(set_id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("WBS set {set_id}")))?;
        set.latest_run_id = Some(run_id.clone());
        Ok(())
    }

    fn list_sets(&self, project: Option<&ProjectId>) -> StoreResult<Vec<WbsSet>> {
        let sets = self.sets.lock().expect("store lock");
        let mut out: Vec<WbsSet> = sets
            .values()
            .filter(|set| project.is_none_or(|p| &set.project_id == p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

/// Version tag written into stored envelopes.
fn default_version() -> String {
    "1.0".to_string()
}

/// Stored envelope around a WBS set.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSet {
    #[serde(flatten)]
    set: WbsSet,
    saved_at: String,
    #[serde(default = "default_version")]
    version: String,
}

/// Stored envelope around a match run.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRun {
    #[serde(flatten)]
    run: MatchRun,
    saved_at: String,
    #[serde(default = "default_version")]
    version: String,
}

/// JSON-file store: one file per set under `sets/`, one per run under
/// `runs/`, named by id.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates if needed) a store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("sets"))?;
        fs::create_dir_all(base_dir.join("runs"))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn set_path(&self, id: &WbsSetId) -> PathBuf {
        self.base_dir.join("sets").join(format!("{id}.json"))
    }

    fn run_path(&self, id: &RunId) -> PathBuf {
        self.base_dir.join("runs").join(format!("{id}.json"))
    }

    fn read_set(&self, path: &Path) -> StoreResult<Option<StoredSet>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_set(&self, stored: &StoredSet) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(stored)?;
        fs::write(self.set_path(&stored.set.id), json)?;
        Ok(())
    }
}

impl MatchStore for JsonFileStore {
    fn save_set(&self, set: &WbsSet) -> StoreResult<()> {
        let stored = StoredSet {
            set: set.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            version: default_version(),
        };
        self.write_set(&stored)?;
        debug!(set = %set.id, rows = set.row_count(), "saved WBS set");
        Ok(())
    }

    fn get_set(&self, id: &WbsSetId) -> StoreResult<Option<WbsSet>> {
        Ok(self.read_set(&self.set_path(id))?.map(|stored| stored.set))
    }

    fn latest_set(
        &self,
        project: &ProjectId,
        model: Option<&ModelId>,
    ) -> StoreResult<Option<WbsSet>> {
        let mut latest: Option<WbsSet> = None;
        for entry in fs::read_dir(self.base_dir.join("sets"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // Skip files that do not parse rather than failing the
            // whole lookup; a foreign file in the directory is not a
            // storage fault.
            let Ok(Some(stored)) = self.read_set(&path) else {
                continue;
            };
            let set = stored.set;
            if &set.project_id != project {
                continue;
            }
            if model.is_some() && set.model_id.as_ref() != model {
                continue;
            }
            if latest
                .as_ref()
                .is_none_or(|current| set.created_at > current.created_at)
            {
                latest = Some(set);
            }
        }
        Ok(latest)
    }

    fn items(&self, id: &WbsSetId) -> StoreResult<Option<Vec<WbsItem>>> {
        Ok(self.get_set(id)?.map(|set| set.items))
    }

    fn save_run(&self, run: &MatchRun) -> StoreResult<()> {
        let stored = StoredRun {
            run: run.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            version: default_version(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(self.run_path(&run.run_id), json)?;
        debug!(run = %run.run_id, results = run.results.len(), "saved match run");
        Ok(())
    }

    fn get_run(&self, id: &RunId) -> StoreResult<Option<MatchRun>> {
        let path = self.run_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let stored: StoredRun = serde_json::from_str(&contents)?;
        Ok(Some(stored.run))
    }

    fn update_set_latest_run(&self, set_id: &WbsSetId, run_id: &RunId) -> StoreResult<()> {
        let mut stored = self
            .read_set(&self.set_path(set_id))?
            .ok_or_else(|| StoreError::NotFound(format!("WBS set {set_id}")))?;
        stored.set.latest_run_id = Some(run_id.clone());
        self.write_set(&stored)
    }

    fn list_sets(&self, project: Option<&ProjectId>) -> StoreResult<Vec<WbsSet>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.base_dir.join("sets"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(Some(stored)) = self.read_set(&path) else {
                continue;
            };
            if project.is_none_or(|p| &stored.set.project_id == p) {
                out.push(stored.set);
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
