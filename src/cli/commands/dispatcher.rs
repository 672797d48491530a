//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the configuration, catalog and API a command uses
//! - [`CommandDispatcher`] for routing CLI subcommands

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{Collection, HttpApiClient, PreingestApi};
use crate::cli::args::{Cli, Commands};
use crate::config::{self, load_config, ClientConfig};
use crate::error::Result;
use crate::runner::{hydrate, reconcile};
use crate::session::{self, SessionView, SharedSession};
use crate::steps::StepCatalog;
use crate::ui::{should_use_colors, PreingestTheme, UserInterface};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
#[async_trait(?Send)]
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Loaded configuration and access to the server
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    async fn execute(
        &self,
        ctx: &CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Everything a command needs besides its arguments.
pub struct CommandContext {
    project_root: PathBuf,
    config: ClientConfig,
    api: Option<Arc<dyn PreingestApi>>,
    plain_output: bool,
}

impl CommandContext {
    pub fn new(project_root: impl Into<PathBuf>, config: ClientConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            api: None,
            plain_output: false,
        }
    }

    /// Never style output, even on a terminal.
    pub fn with_plain_output(mut self) -> Self {
        self.plain_output = true;
        self
    }

    /// Use the given API instead of connecting over HTTP.
    pub fn with_api(mut self, api: Arc<dyn PreingestApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The theme for command output.
    pub fn theme(&self) -> PreingestTheme {
        if self.plain_output || !should_use_colors() {
            PreingestTheme::plain()
        } else {
            PreingestTheme::new()
        }
    }

    /// The configured step catalog; the built-in one unless `steps_file`
    /// is set. Relative paths are taken from the project root.
    pub fn catalog(&self) -> Result<StepCatalog> {
        match &self.config.steps_file {
            Some(path) => StepCatalog::load(&self.project_root.join(path)),
            None => StepCatalog::builtin(),
        }
    }

    pub fn api(&self) -> Result<Arc<dyn PreingestApi>> {
        if let Some(api) = &self.api {
            return Ok(Arc::clone(api));
        }
        let client = HttpApiClient::new(&self.config.api_url, self.config.request_timeout())?;
        Ok(Arc::new(client))
    }

    /// Fetch a collection and reconcile it into a fresh session view.
    pub async fn open_session(
        &self,
        api: &dyn PreingestApi,
        session_id: &str,
    ) -> Result<SharedSession> {
        let catalog = self.catalog()?;
        let snapshot = api.get_collection(session_id).await?;
        let mut view = SessionView::new(
            &catalog,
            Collection {
                session_id: session_id.to_string(),
                ..Default::default()
            },
        );
        let outcome = reconcile(&mut view, snapshot, Utc::now());
        let shared = session::shared(view);
        hydrate(api, &shared, outcome.hydrations).await;
        Ok(shared)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load configuration for the CLI flags.
    ///
    /// `--api` wins over the config file and the environment. Only `lint`
    /// accepts an invalid configuration, so it can report on it.
    pub fn context(&self, cli: &Cli) -> Result<CommandContext> {
        let mut config = load_config(&self.project_root, cli.config.as_deref())?;
        if let Some(api) = &cli.api {
            config.api_url = api.clone();
        }
        if !matches!(cli.command, Commands::Lint(_)) {
            config::validate(&config)?;
        }
        Ok(CommandContext::new(&self.project_root, config))
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub async fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = self.context(cli)?;
        self.dispatch_with(&ctx, &cli.command, ui).await
    }

    /// Dispatch against an already built context.
    pub async fn dispatch_with(
        &self,
        ctx: &CommandContext,
        command: &Commands,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        match command {
            Commands::Steps(args) => {
                let cmd = super::steps::StepsCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Lint(args) => {
                let cmd = super::lint::LintCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Plan(args) => {
                let cmd = super::plan::PlanCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Run(args) => {
                let cmd = super::run::RunCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Watch(args) => {
                let cmd = super::watch::WatchCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Settings(args) => {
                let cmd = super::settings::SettingsCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Result(args) => {
                let cmd = super::result::ResultCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
            Commands::Lookups(_) => {
                let cmd = super::lookups::LookupsCommand::new();
                cmd.execute(ctx, ui).await
            }
            Commands::Reset(args) => {
                let cmd = super::reset::ResetCommand::new(args.clone());
                cmd.execute(ctx, ui).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn api_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let cli = Cli::parse_from(["preingest", "--api", "http://other:9000/api/", "steps"]);
        let ctx = dispatcher.context(&cli).unwrap();
        assert_eq!(ctx.config().api_url, "http://other:9000/api/");
    }

    #[test]
    fn invalid_config_is_rejected_outside_lint() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".preingest")).unwrap();
        fs::write(
            temp.path().join(".preingest/config.yml"),
            "poll_interval_ms: 0\n",
        )
        .unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());

        let steps = Cli::parse_from(["preingest", "--api", "http://localhost/api/", "steps"]);
        assert!(dispatcher.context(&steps).is_err());

        let lint = Cli::parse_from(["preingest", "--api", "http://localhost/api/", "lint"]);
        assert!(dispatcher.context(&lint).is_ok());
    }

    #[test]
    fn steps_file_is_relative_to_project_root() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("steps.yml"),
            "- id: unpack\n  action_name: UnpackTarHandler\n",
        )
        .unwrap();
        let config = ClientConfig {
            steps_file: Some(PathBuf::from("steps.yml")),
            ..Default::default()
        };
        let ctx = CommandContext::new(temp.path(), config);
        assert_eq!(ctx.catalog().unwrap().len(), 1);
    }
}
