//! CLI argument definitions for the drawing document converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use vdoc_model::Version;

#[derive(Parser)]
#[command(
    name = "vdoc",
    version,
    about = "Inspect and convert versioned drawing documents",
    long_about = "Convert drawing documents between the binary and text \
                  renditions of the format.\n\n\
                  Handles every format revision from 1.0 to the current 2.3, \
                  settings-inclusion policies, and paper-size inference."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a document between formats and versions.
    Convert(ConvertArgs),

    /// Show format, version and content summary of a document.
    Info(InfoArgs),

    /// List the predefined paper catalogue.
    Papers(PapersArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input document (binary or text; format is auto-detected).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output format.
    #[arg(long = "to", value_enum)]
    pub to: FormatArg,

    /// Target format version, e.g. 1.5 or 2.3 (default: current).
    #[arg(long = "to-version", value_name = "VERSION", default_value_t = Version::CURRENT)]
    pub to_version: Version,

    /// How much global canvas state to include in the output.
    #[arg(long = "settings", value_enum, default_value = "none")]
    pub settings: SettingsModeArg,

    /// Paper inference strategy when the output needs a paper descriptor
    /// the input never carried.
    #[arg(long = "infer", value_enum, default_value = "closest-fit")]
    pub infer: InferArg,
}

#[derive(Parser)]
pub struct InfoArgs {
    /// Input document (binary or text; format is auto-detected).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Emit machine-readable JSON instead of the human summary.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct PapersArgs {
    /// Only list papers available at this format version.
    #[arg(long = "at-version", value_name = "VERSION")]
    pub at_version: Option<Version>,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// Output format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Binary,
    Text,
}

/// Settings-inclusion choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SettingsModeArg {
    None,
    All,
    PaperOnly,
}

/// Paper inference choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum InferArg {
    ClosestFit,
    ClosestEnclosing,
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
