//! CLI argument definitions for folio.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use folio_cli::plan::{InsertSpec, MoveSpec};
use folio_model::SortKey;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Arrange PDF documents and merge them into one",
    long_about = "Arrange PDF documents and merge them into one.\n\n\
                  Documents are merged in the order they were added, adjusted by\n\
                  any --move or --insert gestures. Sorting only changes how the\n\
                  list is shown and how positions are counted."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Settings file to use instead of the default location.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show page counts and sizes of documents.
    Info(InfoArgs),

    /// Merge documents into a single PDF.
    Merge(MergeArgs),

    /// Show the effective settings.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct InfoArgs {
    /// PDF documents to inspect.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Order in which the documents are listed.
    #[arg(long = "sort", value_enum, default_value = "default")]
    pub sort: SortArg,
}

#[derive(Parser)]
pub struct MergeArgs {
    /// PDF documents to merge, in merge order.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Output file (default: `merge.default_output_name` from settings).
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Order in which the documents are listed and positions are counted.
    #[arg(long = "sort", value_enum, default_value = "default")]
    pub sort: SortArg,

    /// Drag the document listed at FROM onto position TO (or `end`).
    ///
    /// Positions are 1-based and refer to the list as currently shown.
    /// Repeat to apply several moves in order.
    #[arg(long = "move", value_name = "FROM:TO")]
    pub moves: Vec<MoveSpec>,

    /// Drop FILE in front of the document listed at AT (or at `end`).
    #[arg(long = "insert", value_name = "AT:FILE")]
    pub inserts: Vec<InsertSpec>,

    /// Print the merge order without merging.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Open the output folder after a successful merge.
    #[arg(long = "reveal")]
    pub reveal: bool,

    /// Helper program to run instead of `engine.program` from settings.
    #[arg(long = "helper", value_name = "PROGRAM")]
    pub helper: Option<String>,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Write the default settings to the settings file.
    #[arg(long = "write-default")]
    pub write_default: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Default,
    Name,
    Size,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Default => Self::Default,
            SortArg::Name => Self::Name,
            SortArg::Size => Self::Size,
        }
    }
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
