//! Preingest - workflow reconciliation and orchestration for pre-ingest
//! archival processing.
//!
//! The pre-ingest server executes processing steps (unpacking, virus
//! scanning, checksums, metadata conversion, validation, reporting) on
//! uploaded collections. This crate keeps a client-side view of one
//! collection consistent with the server, decides which steps may run,
//! which settings they need, and drives their execution.
//!
//! # Modules
//!
//! - [`api`] - Server operations and wire types
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Client configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Dependency graph, reconciliation and execution drivers
//! - [`session`] - Per-collection state shared by the watcher and drivers
//! - [`steps`] - Step catalog and derived step state
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use preingest::runner::dependencies;
//! use preingest::steps::StepCatalog;
//!
//! let catalog = StepCatalog::builtin().unwrap();
//! let greenlist = catalog.get("greenlist").unwrap();
//! let needs: Vec<&str> = dependencies(greenlist, catalog.definitions())
//!     .iter()
//!     .map(|d| d.id.as_str())
//!     .collect();
//! assert_eq!(needs, vec!["exporting", "profiling", "unpack"]);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod session;
pub mod steps;
pub mod ui;

pub use error::{PreingestError, Result};
