//! Watch command implementation.
//!
//! The `preingest watch` command follows a collection until interrupted.

use async_trait::async_trait;
use tracing::debug;

use crate::cli::args::WatchArgs;
use crate::error::Result;
use crate::runner::Watcher;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::display;

/// The watch command implementation.
pub struct WatchCommand {
    args: WatchArgs,
}

impl WatchCommand {
    /// Create a new watch command.
    pub fn new(args: WatchArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &WatchArgs {
        &self.args
    }
}

#[async_trait(?Send)]
impl Command for WatchCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;

        let theme = ctx.theme();
        {
            let view = session.lock().await;
            ui.show_header(&format!("Watching {}", view.session_id()));
            display::show_collection(ui, &theme, &view.collection);
            for step in view.steps.iter().filter(|s| s.status.is_some()) {
                display::show_step(ui, &theme, step);
            }
        }

        let watcher = Watcher::new(api, session, ctx.config());
        let stop = watcher.stop_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received");
                stop.cancel();
            }
        });

        watcher.run(ui, None).await;
        ui.message("Stopped watching");
        Ok(CommandResult::success())
    }
}
