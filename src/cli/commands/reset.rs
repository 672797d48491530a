//! Reset command implementation.
//!
//! The `preingest reset` command clears the action history of a collection,
//! or removes the collection altogether.

use async_trait::async_trait;
use tracing::info;

use crate::cli::args::ResetArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The reset command implementation.
pub struct ResetCommand {
    args: ResetArgs,
}

impl ResetCommand {
    /// Create a new reset command.
    pub fn new(args: ResetArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ResetArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for ResetCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session_id = &self.args.session;

        if self.args.remove {
            api.remove_session(session_id).await?;
            info!(session_id = %session_id, "session removed");
            ui.success(&format!("Removed {}", session_id));
        } else {
            api.cancel_execution_plan(session_id).await?;
            api.reset_session(session_id).await?;
            info!(session_id = %session_id, "session reset");
            ui.success(&format!("Cleared the history of {}", session_id));
        }

        Ok(CommandResult::success())
    }
}
