//! folio: arrange PDF documents and merge them into one.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use folio_cli::logging::{LogConfig, LogFormat, init_logging};
use folio_cli::settings::{load_settings, resolve_path};
use folio_core::MergeOutcome;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_config, run_info, run_merge};

/// Exit status after the user interrupted a merge.
const EXIT_CANCELLED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let settings_path = resolve_path(cli.config.as_deref());
    let settings = load_settings(settings_path.as_deref());

    let exit_code = match &cli.command {
        Command::Info(args) => match run_info(args, &settings) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Merge(args) => match run_merge(args, &settings) {
            Ok(None) => 0,
            Ok(Some(MergeOutcome::Succeeded { output })) => {
                println!("Merged into {}", output.display());
                0
            }
            Ok(Some(MergeOutcome::Cancelled)) => {
                eprintln!("Merge cancelled.");
                EXIT_CANCELLED
            }
            Ok(Some(MergeOutcome::Failed { reason })) => {
                eprintln!("error: merge failed: {reason}");
                1
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Config(args) => match run_config(args, settings_path.as_deref(), &settings) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
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
