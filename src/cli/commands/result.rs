//! Result command implementation.
//!
//! The `preingest result` command shows the result of a step's last action:
//! the JSON or log detail, or a download link for binary reports.

use async_trait::async_trait;

use crate::api::ActionResult;
use crate::cli::args::ResultArgs;
use crate::error::Result;
use crate::runner::{load_step_result, refresh_step_result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The result command implementation.
pub struct ResultCommand {
    args: ResultArgs,
}

impl ResultCommand {
    /// Create a new result command.
    pub fn new(args: ResultArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ResultArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for ResultCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;

        if self.args.refresh {
            refresh_step_result(api.as_ref(), &session, &self.args.step).await?;
        } else {
            load_step_result(api.as_ref(), &session, &self.args.step).await?;
        }

        let theme = ctx.theme();
        let view = session.lock().await;
        let Some(step) = view.step(&self.args.step) else {
            return Ok(CommandResult::failure(2));
        };
        let Some(action) = &step.last_action else {
            ui.message(&format!("{} has not run yet", step.id()));
            return Ok(CommandResult::success());
        };

        ui.message(&format!(
            "{} {} {}",
            theme.highlight.apply_to(step.id()),
            theme.format_status(step.status),
            theme.dim.apply_to(&action.process_id)
        ));
        if let Some(summary) = &action.summary {
            ui.message(&format!(
                "  processed {}, accepted {}, rejected {}",
                summary.processed, summary.accepted, summary.rejected
            ));
        }

        match &step.result {
            Some(ActionResult::Json(detail)) => {
                for datum in &detail.action_data {
                    ui.message(&format!("  {}", datum));
                }
            }
            Some(ActionResult::Text(text)) => {
                for line in text.lines() {
                    ui.message(&format!("  {}", line));
                }
            }
            None => {}
        }
        if let Some(url) = &step.download_url {
            ui.message(&format!("  {} {}", theme.key.apply_to("download:"), url));
        }

        Ok(CommandResult::success())
    }
}
