//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "netlog.toml";

/// netlog -- flatten collected firewall logs into canonical JSON Lines.
///
/// Use `netlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "netlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the netlog.toml configuration file (default: ./netlog.toml if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten every eligible log file under an input root.
    Run(RunArgs),

    /// Preview the normalized events of a single file without writing output.
    Inspect(InspectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Process an input root and write one JSON Lines file per source file.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input root (overrides `router.input_root`).
    pub root: Option<PathBuf>,

    /// Output root (overrides `router.output_root`).
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Number of files processed concurrently (overrides `runtime.workers`).
    #[arg(short, long)]
    pub workers: Option<usize>,
}

// ---- inspect ----

/// Classify one file and print its first normalized events.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Source file to inspect.
    pub file: PathBuf,

    /// Maximum number of events to print.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

// ---- config ----

/// Manage netlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + defaults).
    Show {
        /// Show only a specific section (general, router, normalizer, passthrough, runtime).
        #[arg(long)]
        section: Option<String>,
    },
}
