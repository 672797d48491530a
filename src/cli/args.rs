//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Preingest - Drive and watch pre-ingest workflows on a collection.
#[derive(Debug, Parser)]
#[command(name = "preingest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .preingest/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Base URL of the pre-ingest API
    #[arg(long, global = true, env = "PREINGEST_API")]
    pub api: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the step catalog with dependencies
    Steps(StepsArgs),

    /// Validate the step catalog and client configuration
    Lint(LintArgs),

    /// Show the reconciled status of a collection
    Status(StatusArgs),

    /// Schedule steps as a server-side plan
    Plan(PlanArgs),

    /// Run steps one at a time, stopping on the first failure
    Run(RunArgs),

    /// Follow a collection until interrupted
    Watch(WatchArgs),

    /// Show or edit the settings of a collection
    Settings(SettingsArgs),

    /// Show the result of a step's last action
    Result(ResultArgs),

    /// List stylesheets and schemas available on the server
    Lookups(LookupsArgs),

    /// Clear the action history of a collection
    Reset(ResetArgs),
}

/// Arguments for the `steps` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StepsArgs {
    /// Show the transitive dependencies and dependents of one step
    #[arg(long)]
    pub step: Option<String>,
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Session id of the collection
    pub session: String,

    /// Output the collection snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Session id of the collection
    pub session: String,

    /// Steps to schedule (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub steps: Vec<String>,

    /// Also schedule every step the given steps depend on
    #[arg(long)]
    pub with_dependencies: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Session id of the collection
    pub session: String,

    /// Steps to run (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub steps: Vec<String>,

    /// Keep going after a step does not succeed
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct WatchArgs {
    /// Session id of the collection
    pub session: String,
}

/// Arguments for the `settings` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsArgs {
    /// Session id of the collection
    pub session: String,

    /// Set a value, like `checksumType=SHA256` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Clear a value (repeatable)
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,

    /// Steps whose requirements to show (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub steps: Vec<String>,
}

/// Arguments for the `result` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResultArgs {
    /// Session id of the collection
    pub session: String,

    /// Step id
    pub step: String,

    /// Fetch again even if already loaded
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the `lookups` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LookupsArgs {}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResetArgs {
    /// Session id of the collection
    pub session: String,

    /// Remove the collection and its uploaded file instead
    #[arg(long)]
    pub remove: bool,
}
