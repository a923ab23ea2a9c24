//! Command implementations.
//!
//! Store-only commands open the JSON store directly; commands that talk
//! to the element data service additionally build an HTTP client from
//! the service flags (falling back to `BWM_SERVICE_URL` and
//! `BWM_SERVICE_TOKEN`).

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info_span;

use bwm_core::{JsonFileStore, MatchService, MatchStore};
use bwm_elements::{
    HttpElementClient, all_elements_filter, fetch_model_elements, resolve_category_elements,
};
use bwm_model::{MatchRun, ModelId, ProjectId, WbsSetId};
use bwm_wbs::WbsRowInput;

use crate::cli::{
    ElementsFetchArgs, ElementsResolveArgs, MatchRunArgs, MatchShowArgs, ServiceArgs,
    WbsImportArgs, WbsListArgs,
};
use crate::summary::{
    print_elements, print_resolution, print_run_detail, print_run_summary, print_sets,
};

pub fn run_wbs_import(store_dir: &Path, args: &WbsImportArgs) -> Result<()> {
    let span = info_span!("wbs_import", csv = %args.csv_file.display());
    let _guard = span.enter();

    let project = ProjectId::new(args.project.clone())?;
    let model = args.model.as_deref().map(ModelId::new).transpose()?;
    let source_name = args.source_name.clone().unwrap_or_else(|| {
        args.csv_file
            .file_name()
            .map_or_else(|| "wbs.csv".to_string(), |n| n.to_string_lossy().to_string())
    });

    let rows = read_wbs_csv(&args.csv_file)?;
    let set = bwm_wbs::build_set(project, model, &source_name, &rows)?;
    let store = open_store(store_dir)?;
    store
        .save_set(&set)
        .with_context(|| format!("saving WBS set to {}", store_dir.display()))?;
    println!("Saved WBS set {} ({} rows)", set.id, set.row_count());
    Ok(())
}

pub fn run_wbs_list(store_dir: &Path, args: &WbsListArgs) -> Result<()> {
    let project = args.project.as_deref().map(ProjectId::new).transpose()?;
    let store = open_store(store_dir)?;
    let sets = store.list_sets(project.as_ref())?;
    print_sets(&sets);
    Ok(())
}

pub fn run_elements_resolve(args: &ElementsResolveArgs) -> Result<()> {
    let model = ModelId::new(args.model.clone())?;
    let client = build_client(&args.service)?;
    let resolution = resolve_category_elements(&client, &model, &args.category)?;
    print_resolution(&args.category, &resolution);
    Ok(())
}

pub fn run_elements_fetch(args: &ElementsFetchArgs) -> Result<()> {
    let model = ModelId::new(args.model.clone())?;
    let client = build_client(&args.service)?;
    let elements = fetch_model_elements(&client, &model, &all_elements_filter())?;
    print_elements(&elements);
    Ok(())
}

pub fn run_match_run(store_dir: &Path, args: &MatchRunArgs) -> Result<()> {
    let project = ProjectId::new(args.project.clone())?;
    let model = ModelId::new(args.model.clone())?;
    let set_id = args.wbs_set.as_deref().map(WbsSetId::parse);

    let store = open_store(store_dir)?;
    let client = build_client(&args.service)?;
    let service = MatchService::new(&store, &client);

    let summary = service.run_matching(&project, &model, set_id.as_ref())?;
    let run = store
        .get_run(&summary.run_id)?
        .context("run was saved but could not be read back")?;
    print_run_summary(&summary, &run);
    Ok(())
}

pub fn run_match_show(store_dir: &Path, args: &MatchShowArgs) -> Result<()> {
    let project = ProjectId::new(args.project.clone())?;
    let model = ModelId::new(args.model.clone())?;
    let store = open_store(store_dir)?;

    let Some(run) = latest_run(&store, &project, &model)? else {
        bail!(
            "no match run recorded for project {project} model {model}; \
             run `bwm match run` first"
        );
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_run_detail(&run);
    }
    Ok(())
}

fn latest_run(
    store: &JsonFileStore,
    project: &ProjectId,
    model: &ModelId,
) -> Result<Option<MatchRun>> {
    let Some(set) = store.latest_set(project, Some(model))? else {
        return Ok(None);
    };
    let Some(run_id) = set.latest_run_id else {
        return Ok(None);
    };
    Ok(store.get_run(&run_id)?)
}

fn read_wbs_csv(path: &Path) -> Result<Vec<WbsRowInput>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<WbsRowInput>().enumerate() {
        // Header row is line 1.
        let row = record.with_context(|| format!("parsing {} row {}", path.display(), index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

fn open_store(store_dir: &Path) -> Result<JsonFileStore> {
    JsonFileStore::new(store_dir)
        .with_context(|| format!("opening store at {}", store_dir.display()))
}

fn build_client(service: &ServiceArgs) -> Result<HttpElementClient> {
    let url = match &service.service_url {
        Some(url) => url.clone(),
        None => match std::env::var("BWM_SERVICE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => bail!("element data service URL required (--service-url or BWM_SERVICE_URL)"),
        },
    };
    let token = service
        .service_token
        .clone()
        .or_else(|| std::env::var("BWM_SERVICE_TOKEN").ok())
        .filter(|t| !t.trim().is_empty());
    Ok(HttpElementClient::new(url, token)?)
}
