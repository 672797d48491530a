//! User-facing notices and terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for notices raised by the watcher and drivers
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] capturing notices for tests
//! - Duration, date and size formatting in [`format`]
//!
//! # Example
//!
//! ```
//! use preingest::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.warning("Execution plan aborted");
//! assert!(ui.has_warning("aborted"));
//! ```

pub mod format;
pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use format::{format_date, format_duration, format_file_size};
pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, PreingestTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface: Send {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);
}
