//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`preingest status`, `preingest run`)
//! - Shared configuration loading and API construction
//! - Consistent global flag handling

pub mod dispatcher;
pub mod display;
pub mod lint;
pub mod lookups;
pub mod plan;
pub mod reset;
pub mod result;
pub mod run;
pub mod settings;
pub mod status;
pub mod steps;
pub mod watch;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
