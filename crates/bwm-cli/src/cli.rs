//! CLI argument definitions for the BIM-WBS matcher.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bwm",
    version,
    about = "BIM-WBS Matcher - reconcile model elements with a WBS schedule",
    long_about = "Reconcile BIM model elements with a project's Work Breakdown\n\
                  Structure (WBS) schedule.\n\n\
                  Imports WBS schedules from CSV, queries model elements from the\n\
                  element data service, and assigns each element to a WBS item with\n\
                  a confidence score."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory holding the local JSON store for sets and runs.
    #[arg(
        long = "store",
        value_name = "DIR",
        default_value = "bwm-store",
        global = true
    )]
    pub store_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import and inspect WBS schedule sets.
    #[command(subcommand)]
    Wbs(WbsCommand),

    /// Query model elements from the element data service.
    #[command(subcommand)]
    Elements(ElementsCommand),

    /// Run and inspect matching passes.
    #[command(subcommand)]
    Match(MatchCommand),
}

#[derive(Subcommand)]
pub enum WbsCommand {
    /// Validate a WBS CSV and save it as a new immutable set.
    Import(WbsImportArgs),

    /// List saved WBS sets, newest first.
    List(WbsListArgs),
}

#[derive(Args)]
pub struct WbsImportArgs {
    /// Path to the WBS schedule CSV.
    #[arg(value_name = "CSV_FILE")]
    pub csv_file: PathBuf,

    /// Project the schedule belongs to.
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub project: String,

    /// Model the schedule targets; omit for a project-wide schedule.
    #[arg(long = "model", value_name = "MODEL_ID")]
    pub model: Option<String>,

    /// Recorded source name (default: the CSV file name).
    #[arg(long = "source-name", value_name = "NAME")]
    pub source_name: Option<String>,
}

#[derive(Args)]
pub struct WbsListArgs {
    /// Restrict the listing to one project.
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub project: Option<String>,
}

#[derive(Subcommand)]
pub enum ElementsCommand {
    /// Resolve a category label and list its elements.
    Resolve(ElementsResolveArgs),

    /// Fetch every element of a model.
    Fetch(ElementsFetchArgs),
}

#[derive(Args)]
pub struct ElementsResolveArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Model to query.
    #[arg(long = "model", value_name = "MODEL_ID")]
    pub model: String,

    /// Human category label, e.g. "Structural Columns".
    #[arg(value_name = "CATEGORY")]
    pub category: String,
}

#[derive(Args)]
pub struct ElementsFetchArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Model to query.
    #[arg(long = "model", value_name = "MODEL_ID")]
    pub model: String,
}

#[derive(Subcommand)]
pub enum MatchCommand {
    /// Match every element of a model against a WBS set.
    Run(MatchRunArgs),

    /// Show the latest match run for a project/model.
    Show(MatchShowArgs),
}

#[derive(Args)]
pub struct MatchRunArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Project owning the WBS schedule.
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub project: String,

    /// Model whose elements are matched.
    #[arg(long = "model", value_name = "MODEL_ID")]
    pub model: String,

    /// Match against this set instead of the latest one.
    #[arg(long = "wbs-set", value_name = "SET_ID")]
    pub wbs_set: Option<String>,
}

#[derive(Args)]
pub struct MatchShowArgs {
    /// Project owning the WBS schedule.
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub project: String,

    /// Model whose latest run is shown.
    #[arg(long = "model", value_name = "MODEL_ID")]
    pub model: String,

    /// Print the full run as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// Connection flags for the element data service.
#[derive(Args)]
pub struct ServiceArgs {
    /// Base URL of the element data service (or BWM_SERVICE_URL).
    #[arg(long = "service-url", value_name = "URL")]
    pub service_url: Option<String>,

    /// Bearer token for the service (or BWM_SERVICE_TOKEN).
    #[arg(long = "service-token", value_name = "TOKEN")]
    pub service_token: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
