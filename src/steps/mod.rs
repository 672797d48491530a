//! Step definitions and their runtime state.
//!
//! - [`StepDefinition`] - a selectable server-side handler, as authored
//! - [`StepCatalog`] - the validated, ordered list of definitions
//! - [`Step`] / [`StepStatus`] - per-session derived state
//!
//! # Example
//!
//! ```
//! use preingest::steps::StepCatalog;
//!
//! let catalog = StepCatalog::builtin().unwrap();
//! let unpack = catalog.get("unpack").unwrap();
//! assert_eq!(unpack.action_name, "UnpackTarHandler");
//! ```

pub mod catalog;
pub mod definition;
pub mod state;
pub mod validator;

pub use catalog::StepCatalog;
pub use definition::{DependentSetting, StepDefinition};
pub use state::{Step, StepStatus, TriggerHold};
pub use validator::{validate_steps, Severity, ValidationError};
