//! BIM-WBS Matcher CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

use bwm_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, ElementsCommand, LogFormatArg, LogLevelArg, MatchCommand, WbsCommand};
use crate::commands::{
    run_elements_fetch, run_elements_resolve, run_match_run, run_match_show, run_wbs_import,
    run_wbs_list,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let store_dir = cli.store_dir.clone();
    let result = match cli.command {
        Command::Wbs(WbsCommand::Import(args)) => run_wbs_import(&store_dir, &args),
        Command::Wbs(WbsCommand::List(args)) => run_wbs_list(&store_dir, &args),
        Command::Elements(ElementsCommand::Resolve(args)) => run_elements_resolve(&args),
        Command::Elements(ElementsCommand::Fetch(args)) => run_elements_fetch(&args),
        Command::Match(MatchCommand::Run(args)) => run_match_run(&store_dir, &args),
        Command::Match(MatchCommand::Show(args)) => run_match_show(&store_dir, &args),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
