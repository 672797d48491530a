//! Settings command implementation.
//!
//! The `preingest settings` command shows the settings of a collection,
//! marking which ones the selected steps need and which are locked, and
//! optionally edits them.

use async_trait::async_trait;

use crate::api::{Settings, SettingsKey};
use crate::cli::args::SettingsArgs;
use crate::error::{PreingestError, Result};
use crate::runner::update_settings;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The settings command implementation.
pub struct SettingsCommand {
    args: SettingsArgs,
}

impl SettingsCommand {
    /// Create a new settings command.
    pub fn new(args: SettingsArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &SettingsArgs {
        &self.args
    }

    /// Apply `--set` and `--unset` on top of the current settings.
    pub fn edited(&self, current: &Settings) -> Result<Settings> {
        let mut candidate = current.clone();
        for assignment in &self.args.set {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                PreingestError::ConfigValidationError {
                    message: format!("Expected KEY=VALUE, got '{}'", assignment),
                }
            })?;
            candidate.set(key.trim().parse()?, Some(value.trim().to_string()))?;
        }
        for key in &self.args.unset {
            candidate.set(key.trim().parse()?, None)?;
        }
        Ok(candidate)
    }

    fn is_edit(&self) -> bool {
        !self.args.set.is_empty() || !self.args.unset.is_empty()
    }
}

#[async_trait(?Send)]
impl Command for SettingsCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let api = ctx.api()?;
        let session = ctx.open_session(api.as_ref(), &self.args.session).await?;

        let candidate = {
            let mut view = session.lock().await;
            if !self.args.steps.is_empty() {
                if let Err(e) = view.select_only(&self.args.steps) {
                    ui.error(&e.to_string());
                    return Ok(CommandResult::failure(2));
                }
            }
            match self.edited(&view.collection.settings) {
                Ok(candidate) => candidate,
                Err(e) => {
                    ui.error(&e.to_string());
                    return Ok(CommandResult::failure(2));
                }
            }
        };

        if self.is_edit() {
            match update_settings(api.as_ref(), &session, candidate).await {
                Ok(()) => ui.success("Settings saved"),
                Err(e @ PreingestError::SettingLocked { .. }) => {
                    ui.error(&e.to_string());
                    return Ok(CommandResult::failure(2));
                }
                Err(e) => return Err(e),
            }
        }

        let theme = ctx.theme();
        let view = session.lock().await;
        let required = view.required_settings(None);
        let missing = view.missing_settings();
        let locked = view.locked_settings(None);

        for key in SettingsKey::ALL {
            let value = view.collection.settings.get(key).unwrap_or("");
            let mut flags = Vec::new();
            if missing.contains(&key) {
                flags.push("missing");
            } else if required.contains(&key) {
                flags.push("required");
            }
            if locked.contains(&key) {
                flags.push("locked");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" {}", theme.dim.apply_to(format!("[{}]", flags.join(", "))))
            };
            ui.message(&format!(
                "  {:<20} {}{}",
                theme.key.apply_to(key.as_str()),
                value,
                flags
            ));
        }

        if missing.is_empty() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChecksumType;

    fn cmd(set: &[&str], unset: &[&str]) -> SettingsCommand {
        SettingsCommand::new(SettingsArgs {
            session: "s1".into(),
            set: set.iter().map(|s| s.to_string()).collect(),
            unset: unset.iter().map(|s| s.to_string()).collect(),
            steps: vec![],
        })
    }

    #[test]
    fn edits_are_applied_in_order() {
        let current = Settings {
            prewash: Some("old.xslt".into()),
            ..Default::default()
        };
        let edited = cmd(&["checksumType=sha1", "checksumValue = abc"], &["prewash"])
            .edited(&current)
            .unwrap();
        assert_eq!(edited.checksum_type, Some(ChecksumType::SHA1));
        assert_eq!(edited.checksum_value.as_deref(), Some("abc"));
        assert_eq!(edited.prewash, None);
    }

    #[test]
    fn malformed_assignment_is_rejected() {
        assert!(cmd(&["checksumType"], &[]).edited(&Settings::default()).is_err());
        assert!(cmd(&["nope=1"], &[]).edited(&Settings::default()).is_err());
    }
}
