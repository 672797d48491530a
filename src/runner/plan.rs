//! Scheduling the selected steps as a server-side plan.

use tracing::info;

use crate::api::{PreingestApi, Settings};
use crate::error::{PreingestError, Result};
use crate::session::SharedSession;

/// Submit the selected steps as one plan, replacing any existing plan.
///
/// Returns the number of scheduled items; an empty selection submits
/// nothing and returns zero.
///
/// # Errors
///
/// `MissingSettings` when a selected step needs a setting that has no
/// value, before anything is sent.
pub async fn start_plan(api: &dyn PreingestApi, session: &SharedSession) -> Result<usize> {
    let (session_id, plan) = {
        let view = session.lock().await;
        let missing = view.missing_settings();
        if !missing.is_empty() {
            return Err(PreingestError::MissingSettings {
                keys: missing.into_iter().collect(),
            });
        }
        (view.session_id().to_string(), view.build_plan())
    };

    if plan.is_empty() {
        return Ok(0);
    }

    api.start_execution_plan(&session_id, &plan).await?;
    info!(session_id = %session_id, items = plan.workflow.len(), "execution plan submitted");
    Ok(plan.workflow.len())
}

/// Accept edited settings locally and persist them.
///
/// The local view is updated before the request, so the next
/// reconciliation does not flash the old values.
///
/// # Errors
///
/// `SettingLocked` when the edit changes a value a completed step relies
/// on; nothing is sent in that case.
pub async fn update_settings(
    api: &dyn PreingestApi,
    session: &SharedSession,
    candidate: Settings,
) -> Result<()> {
    let session_id = {
        let mut view = session.lock().await;
        view.apply_settings(candidate.clone())?;
        view.session_id().to_string()
    };
    api.save_settings(&session_id, &candidate).await
}
