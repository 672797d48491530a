//! Access to the pre-ingest server.
//!
//! - [`PreingestApi`] - the capabilities the core consumes
//! - [`HttpApiClient`] - the default implementation over HTTP
//! - [`LookupCache`] - stylesheet and schema lists, loaded once
//! - [`repeat_until_result`] - fixed-delay polling with a time budget
//! - wire types in [`types`]

pub mod client;
pub mod lookup;
pub mod repeat;
pub mod types;

pub use client::HttpApiClient;
pub use lookup::LookupCache;
pub use repeat::repeat_until_result;
pub use types::{
    merge_collections, parse_timestamp, Action, ActionResult, ActionResultDetail, ActionStatus,
    ActionSummary, ChecksumType, Collection, CollectionPatch, ExecutionPlan, OverallStatus,
    ResultValue, ServerFile, Settings, SettingsKey, TriggerActionResult, WorkflowItem,
    WorkflowItemStatus,
};

use async_trait::async_trait;

use crate::error::Result;

/// Operations offered by the pre-ingest server.
///
/// Implemented by [`HttpApiClient`]; tests provide scripted in-memory
/// implementations.
#[async_trait]
pub trait PreingestApi: Send + Sync {
    /// Fetch all collections known to the server.
    async fn get_collections(&self) -> Result<Vec<Collection>>;

    /// Fetch the current snapshot of one collection.
    ///
    /// A `null` settings value is normalized to empty settings.
    async fn get_collection(&self, session_id: &str) -> Result<Collection>;

    /// Submit a plan as-is. The server silently ignores it while another
    /// (even completed) plan exists; use [`start_execution_plan`] instead.
    ///
    /// [`start_execution_plan`]: PreingestApi::start_execution_plan
    async fn submit_execution_plan(
        &self,
        session_id: &str,
        plan: &ExecutionPlan,
    ) -> Result<Option<TriggerActionResult>>;

    /// Remove any existing or completed plan.
    async fn cancel_execution_plan(&self, session_id: &str) -> Result<()>;

    /// Fetch a result file: JSON for `.json` files, plain text otherwise.
    async fn get_action_result(&self, session_id: &str, result_file: &str)
        -> Result<ActionResult>;

    /// Download URL for a binary result file.
    fn action_report_url(&self, session_id: &str, file: &str) -> String;

    /// Store settings. This does not wait for the server to apply them.
    async fn save_settings(&self, session_id: &str, settings: &Settings) -> Result<()>;

    /// Clear the action history of a session.
    async fn reset_session(&self, session_id: &str) -> Result<()>;

    /// Remove a session together with its uploaded file.
    async fn remove_session(&self, session_id: &str) -> Result<()>;

    /// List the transformation stylesheets available on the server.
    async fn list_stylesheets(&self) -> Result<Vec<ServerFile>>;

    /// List the validation schemas available on the server.
    async fn list_schemas(&self) -> Result<Vec<ServerFile>>;

    /// Replace any existing plan with the given one: cancel first, then
    /// submit.
    async fn start_execution_plan(
        &self,
        session_id: &str,
        plan: &ExecutionPlan,
    ) -> Result<Option<TriggerActionResult>> {
        self.cancel_execution_plan(session_id).await?;
        self.submit_execution_plan(session_id, plan).await
    }
}
