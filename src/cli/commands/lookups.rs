//! Lookups command implementation.
//!
//! The `preingest lookups` command lists the stylesheets and schemas the
//! server offers for the prewash, polish and validation settings.

use async_trait::async_trait;

use crate::api::LookupCache;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The lookups command implementation.
#[derive(Debug, Default)]
pub struct LookupsCommand;

impl LookupsCommand {
    /// Create a new lookups command.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl Command for LookupsCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let lookups = LookupCache::new();
        let theme = ctx.theme();

        let sections = [
            ("prewash:", lookups.prewash_stylesheets(api.as_ref()).await?),
            ("polish:", lookups.polish_stylesheets(api.as_ref()).await?),
            ("schemaToValidate:", lookups.schemas(api.as_ref()).await?),
        ];
        for (label, names) in sections {
            ui.message(&format!("  {}", theme.key.apply_to(label)));
            if names.is_empty() {
                ui.message(&format!("    {}", theme.dim.apply_to("(none)")));
            }
            for name in names {
                ui.message(&format!("    {}", name));
            }
        }

        Ok(CommandResult::success())
    }
}
