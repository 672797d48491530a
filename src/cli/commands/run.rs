//! Run command implementation.
//!
//! The `preingest run` command triggers steps one at a time and waits for
//! each to finish before starting the next.

use async_trait::async_trait;
use std::sync::Arc;

use crate::cli::args::RunArgs;
use crate::error::{PreingestError, Result};
use crate::runner::{CompletionCallback, PlanTrigger, SequentialDriver, TriggerRegistry};
use crate::steps::{Step, StepStatus};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::display;

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for RunCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;

        let queued = {
            let mut view = session.lock().await;
            if let Err(e) = view.select_only(&self.args.steps) {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            let missing = view.missing_settings();
            if !missing.is_empty() {
                let err = PreingestError::MissingSettings {
                    keys: missing.into_iter().collect(),
                };
                ui.error(&err.to_string());
                return Ok(CommandResult::failure(2));
            }
            view.queue_selected()
        };
        if queued == 0 {
            ui.message("Nothing to run");
            return Ok(CommandResult::success());
        }

        let triggers = TriggerRegistry::new(Arc::new(PlanTrigger::new(ctx.config())));
        let driver = SequentialDriver::new(Arc::clone(&api), session.clone(), triggers);

        let keep_going = self.args.keep_going;
        let mut continue_after =
            |step: &Step| keep_going || step.status == Some(StepStatus::Success);
        let callback: CompletionCallback<'_> = &mut continue_after;
        let summary = driver.run_waiting(ui, Some(callback)).await?;

        let theme = ctx.theme();
        ui.message("");
        let view = session.lock().await;
        for (id, _) in &summary.completed {
            if let Some(step) = view.step(id) {
                display::show_step(ui, &theme, step);
            }
        }

        if summary.all_succeeded() && !summary.halted {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
