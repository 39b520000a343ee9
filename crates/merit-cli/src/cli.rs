use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "MERIT++ CLI - Batch figure-of-merit evaluation for silicon dangling bond gate layouts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Cap the number of worker threads used per evaluation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate figures of merit for every layout found in the input directories.
    Evaluate(EvaluateArgs),
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory containing layout files (*.toml). May be given multiple times.
    #[arg(short, long = "input-dir", required = true, value_name = "PATH")]
    pub input_dirs: Vec<PathBuf>,

    /// Directory the report artifacts are written to.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Evaluate a random subset of this many layout files.
    #[arg(short, long, value_name = "COUNT")]
    pub sample_count: Option<usize>,

    /// Print one progress line per evaluated layout.
    #[arg(long)]
    pub progress: bool,

    /// Additionally write a per-gate report file next to the batch artifacts.
    #[arg(long)]
    pub gate_reports: bool,
}
