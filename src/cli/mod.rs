//! Command-line interface for preingest.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, LintArgs, LookupsArgs, PlanArgs, ResetArgs, ResultArgs, RunArgs, SettingsArgs,
    StatusArgs, StepsArgs, WatchArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
