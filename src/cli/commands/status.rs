//! Status command implementation.
//!
//! The `preingest status` command fetches a collection once and shows the
//! reconciled state of every step.

use async_trait::async_trait;

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::display;

/// The status command implementation.
pub struct StatusCommand {
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(args: StatusArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for StatusCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;
        let view = session.lock().await;

        if self.args.json {
            let json = serde_json::to_string_pretty(&view.collection)
                .map_err(|e| anyhow::anyhow!("failed to serialize collection: {}", e))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let theme = ctx.theme();
        ui.show_header(&format!("Collection {}", view.session_id()));
        display::show_collection(ui, &theme, &view.collection);
        ui.message("");
        for step in &view.steps {
            display::show_step(ui, &theme, step);
        }
        ui.message("");
        display::show_keys(ui, &theme, "Locked settings:", &view.locked_settings(None));

        Ok(CommandResult::success())
    }
}
