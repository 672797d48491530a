//! Plan command implementation.
//!
//! The `preingest plan` command schedules steps as one server-side plan.

use async_trait::async_trait;

use crate::cli::args::PlanArgs;
use crate::error::{PreingestError, Result};
use crate::runner::{dependencies, start_plan};
use crate::session::SessionView;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(args: PlanArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PlanArgs {
        &self.args
    }
}

/// The requested steps, optionally extended with what they depend on.
///
/// Dependencies pinned by a completed step are left out; they already ran.
pub fn expand_selection(
    view: &SessionView,
    requested: &[String],
    with_dependencies: bool,
) -> Result<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();
    for id in requested {
        let step = view
            .step(id)
            .ok_or_else(|| PreingestError::UnknownStep { id: id.clone() })?;
        if with_dependencies {
            for dep in dependencies(step, &view.steps) {
                if dep.is_selectable() && !ids.iter().any(|i| i == dep.id()) {
                    ids.push(dep.id().to_string());
                }
            }
        }
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    Ok(ids)
}

#[async_trait(?Send)]
impl Command for PlanCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;

        {
            let mut view = session.lock().await;
            let ids = expand_selection(&view, &self.args.steps, self.args.with_dependencies)?;
            if let Err(e) = view.select_only(&ids) {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
        }

        match start_plan(api.as_ref(), &session).await {
            Ok(0) => {
                ui.message("Nothing to schedule");
                Ok(CommandResult::success())
            }
            Ok(count) => {
                ui.success(&format!(
                    "Scheduled {} step(s) for {}",
                    count, self.args.session
                ));
                Ok(CommandResult::success())
            }
            Err(e @ PreingestError::MissingSettings { .. }) => {
                ui.error(&e.to_string());
                ui.message(&format!(
                    "Set them with 'preingest settings {} --set KEY=VALUE'",
                    self.args.session
                ));
                Ok(CommandResult::failure(2))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Collection;
    use crate::steps::{StepCatalog, StepDefinition};

    fn view() -> SessionView {
        let catalog = StepCatalog::new(vec![
            StepDefinition::new("unpack", "UnpackTarHandler"),
            StepDefinition::new("scan", "ScanVirusValidationHandler").with_depends_on(&["unpack"]),
            StepDefinition::new("names", "NamingValidationHandler").with_depends_on(&["unpack"]),
            StepDefinition::new("report", "ExcelCreatorHandler")
                .with_depends_on(&["scan", "names"]),
        ])
        .unwrap();
        SessionView::new(&catalog, Collection::default())
    }

    #[test]
    fn selection_without_dependencies_is_as_given() {
        let ids = expand_selection(&view(), &["report".into()], false).unwrap();
        assert_eq!(ids, vec!["report"]);
    }

    #[test]
    fn dependencies_come_first_once() {
        let ids =
            expand_selection(&view(), &["report".into(), "scan".into()], true).unwrap();
        assert_eq!(ids, vec!["scan", "names", "unpack", "report"]);
    }

    #[test]
    fn pinned_dependencies_are_skipped() {
        let mut view = view();
        view.step_mut("unpack").unwrap().fixed_selected = Some(false);
        let ids = expand_selection(&view, &["scan".into()], true).unwrap();
        assert_eq!(ids, vec!["scan"]);
    }

    #[test]
    fn unknown_step_is_rejected() {
        assert!(expand_selection(&view(), &["ghost".into()], true).is_err());
    }
}
