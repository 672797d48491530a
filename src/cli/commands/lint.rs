//! Lint command implementation.
//!
//! The `preingest lint` command validates the step catalog and the client
//! configuration.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::cli::args::LintArgs;
use crate::config::validate_config;
use crate::error::{PreingestError, Result};
use crate::steps::{validate_steps, Severity, StepCatalog};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The lint command implementation.
pub struct LintCommand {
    args: LintArgs,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(args: LintArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &LintArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for LintCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let mut errors = 0;
        let mut warnings = 0;

        for finding in validate_config(ctx.config()) {
            ui.error(&format!("[{}] {}", finding.rule, finding.message));
            errors += 1;
        }

        // Parse without validation so every finding is reported, not just the first.
        let (content, source) = match &ctx.config().steps_file {
            Some(path) => {
                let full = ctx.project_root().join(path);
                let content = std::fs::read_to_string(&full).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        PreingestError::ConfigNotFound { path: full.clone() }
                    } else {
                        PreingestError::Io(e)
                    }
                })?;
                (content, full)
            }
            None => (
                StepCatalog::builtin_source().to_string(),
                PathBuf::from("<builtin>"),
            ),
        };

        let definitions = match StepCatalog::parse_unchecked(&content, &source) {
            Ok(defs) => defs,
            Err(PreingestError::ConfigParseError { path, message }) => {
                ui.error(&format!("Parse error in {}: {}", path.display(), message));
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        for finding in validate_steps(&definitions) {
            let line = format!("[{}] {}", finding.rule, finding.message);
            match finding.severity {
                Severity::Error => {
                    ui.error(&line);
                    errors += 1;
                }
                Severity::Warning => {
                    ui.warning(&line);
                    warnings += 1;
                }
            }
        }

        let failed = errors > 0 || (self.args.strict && warnings > 0);
        if failed {
            ui.error(&format!(
                "{} error(s), {} warning(s) in {}",
                errors,
                warnings,
                source.display()
            ));
            Ok(CommandResult::failure(1))
        } else {
            ui.success(&format!(
                "{} steps valid ({} warning(s))",
                definitions.len(),
                warnings
            ));
            Ok(CommandResult::success())
        }
    }
}
