//! Steps command implementation.
//!
//! The `preingest steps` command lists the step catalog.

use async_trait::async_trait;

use crate::cli::args::StepsArgs;
use crate::error::{PreingestError, Result};
use crate::runner::{dependencies, dependents};
use crate::steps::StepCatalog;
use crate::ui::{PreingestTheme, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The steps command implementation.
pub struct StepsCommand {
    args: StepsArgs,
}

impl StepsCommand {
    /// Create a new steps command.
    pub fn new(args: StepsArgs) -> Self {
        Self { args }
    }

    fn show_closure(
        &self,
        catalog: &StepCatalog,
        id: &str,
        theme: &PreingestTheme,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let definition = catalog
            .get(id)
            .ok_or_else(|| PreingestError::UnknownStep { id: id.to_string() })?;
        let all = catalog.definitions();

        let needs: Vec<_> = dependencies(definition, all).into_iter().map(|d| d.id.as_str()).collect();
        let needed_by: Vec<_> = dependents(definition, all).into_iter().map(|d| d.id.as_str()).collect();

        ui.message(&format!(
            "{} {}",
            theme.highlight.apply_to(&definition.id),
            theme.dim.apply_to(&definition.action_name)
        ));
        ui.message(&format!("  {} {}", theme.key.apply_to("needs:"), join_or_dash(&needs)));
        ui.message(&format!(
            "  {} {}",
            theme.key.apply_to("needed by:"),
            join_or_dash(&needed_by)
        ));
        Ok(())
    }
}

fn join_or_dash(ids: &[&str]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

#[async_trait(?Send)]
impl Command for StepsCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let catalog = ctx.catalog()?;
        let theme = ctx.theme();

        if let Some(id) = &self.args.step {
            self.show_closure(&catalog, id, &theme, ui)?;
            return Ok(CommandResult::success());
        }

        ui.message(&format!("  {}", theme.key.apply_to("Steps:")));
        for step in catalog.definitions() {
            ui.message(&format!(
                "    {} {}",
                theme.highlight.apply_to(&step.id),
                theme.dim.apply_to(format!("({})", step.action_name))
            ));
            if !step.description.is_empty() {
                ui.message(&format!("      {}", theme.dim.apply_to(&step.description)));
            }
            if !step.depends_on.is_empty() {
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── depends on:"),
                    theme.dim.apply_to(step.depends_on.join(", "))
                ));
            }
            if !step.required_settings.is_empty() {
                let keys: Vec<_> = step.required_settings.iter().map(|k| k.as_str()).collect();
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── requires:"),
                    theme.dim.apply_to(keys.join(", "))
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
