//! Fetching result detail for completed actions.
//!
//! Most steps fetch their result lazily, when a user asks for it. A few
//! well-known handlers produce values the collection itself shows (a
//! calculated checksum, report download links); those are fetched as soon
//! as a new completion is observed and routed through [`PostProcess`].

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::api::{ActionResult, PreingestApi};
use crate::error::{PreingestError, Result};
use crate::session::{SessionView, SharedSession};

/// Result files shown inline rather than offered as a download.
static INLINE_RESULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(json|log)$").expect("INLINE_RESULT must compile"));

/// What to do once a new completion of an action is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Store the calculated checksum and its type on the collection.
    Checksum,
    /// Store the Excel report download link on the collection.
    ExcelReport,
    /// Store the metadata index download link on the collection.
    IndexMetadataReport,
    /// Drop any cached result; it is fetched again on demand.
    ClearCached,
}

impl PostProcess {
    /// Route an action name.
    pub fn for_action(action_name: &str) -> Self {
        match action_name {
            "ContainerChecksumHandler" => PostProcess::Checksum,
            "ExcelCreatorHandler" => PostProcess::ExcelReport,
            "IndexMetadataHandler" => PostProcess::IndexMetadataReport,
            _ => PostProcess::ClearCached,
        }
    }

    /// Whether the result must be fetched right away.
    pub fn fetches_result(&self) -> bool {
        !matches!(self, PostProcess::ClearCached)
    }
}

/// A result fetch requested by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationRequest {
    pub step_id: String,
    /// The completion the fetched result belongs to.
    pub process_id: String,
    pub result_files: Vec<String>,
    pub post: PostProcess,
}

/// Result detail of one action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepResult {
    pub result: Option<ActionResult>,
    pub download_url: Option<String>,
}

/// Fetch the result detail listed in `result_files`.
///
/// `.json` and `.log` files are fetched as the result; any other file is
/// offered as a download. At most one of each is expected.
pub async fn fetch_step_result(
    api: &dyn PreingestApi,
    session_id: &str,
    result_files: &[String],
) -> Result<StepResult> {
    let mut fetched = StepResult::default();
    for file in result_files {
        if INLINE_RESULT.is_match(file) {
            fetched.result = Some(api.get_action_result(session_id, file).await?);
        } else {
            fetched.download_url = Some(api.action_report_url(session_id, file));
        }
    }
    Ok(fetched)
}

/// Store a fetched result and run its post-processing.
///
/// Returns `false` (and changes nothing) when the step has moved on to a
/// newer completion since the fetch was requested.
pub fn apply_hydration(
    view: &mut SessionView,
    request: &HydrationRequest,
    fetched: StepResult,
) -> bool {
    let SessionView { collection, steps } = view;
    let Some(step) = steps.iter_mut().find(|s| s.id() == request.step_id) else {
        return false;
    };
    if step.last_action_process_id.as_deref() != Some(request.process_id.as_str()) {
        debug!(step_id = %request.step_id, process_id = %request.process_id, "discarding stale result");
        return false;
    }

    step.result = fetched.result;
    step.download_url = fetched.download_url;

    match request.post {
        PostProcess::Checksum => {
            collection.calculated_checksum_type = collection.settings.checksum_type;
            collection.calculated_checksum_value = step
                .result
                .as_ref()
                .and_then(|r| r.first_datum())
                .map(str::to_string);
        }
        PostProcess::ExcelReport => {
            collection.excel_creator_download_url = step.download_url.clone();
        }
        PostProcess::IndexMetadataReport => {
            collection.index_metadata_download_url = step.download_url.clone();
        }
        PostProcess::ClearCached => {}
    }
    true
}

/// Run hydration requests: fetch outside the lock, apply under it.
///
/// A failed fetch is logged and recorded on the step. The completion stays
/// seen, so reconciling the same snapshot does not ask again; the result is
/// loaded on demand through [`load_step_result`].
pub async fn hydrate(
    api: &dyn PreingestApi,
    session: &SharedSession,
    requests: Vec<HydrationRequest>,
) {
    for request in requests {
        let session_id = session.lock().await.session_id().to_string();
        match fetch_step_result(api, &session_id, &request.result_files).await {
            Ok(fetched) => {
                let mut view = session.lock().await;
                apply_hydration(&mut view, &request, fetched);
            }
            Err(e) => {
                warn!(step_id = %request.step_id, error = %e, "failed to fetch step result");
                let mut view = session.lock().await;
                if let Some(step) = view.step_mut(&request.step_id) {
                    if step.last_action_process_id.as_deref() == Some(request.process_id.as_str())
                    {
                        step.hydration_failed = Some(request.process_id.clone());
                    }
                }
            }
        }
    }
}

/// Ensure a step's result or download link is loaded, fetching it if not
/// known yet.
pub async fn load_step_result(
    api: &dyn PreingestApi,
    session: &SharedSession,
    step_id: &str,
) -> Result<()> {
    let (session_id, action) = {
        let view = session.lock().await;
        let step = view.step(step_id).ok_or_else(|| PreingestError::UnknownStep {
            id: step_id.to_string(),
        })?;
        if step.result.is_some() || step.download_url.is_some() {
            return Ok(());
        }
        let Some(action) = step.last_action.clone() else {
            return Ok(());
        };
        (view.session_id().to_string(), action)
    };

    let fetched = fetch_step_result(api, &session_id, &action.result_files).await?;

    let mut view = session.lock().await;
    let Some(step) = view.step_mut(step_id) else {
        return Ok(());
    };
    let current = step.last_action.as_ref().map(|a| a.process_id.as_str());
    if current != Some(action.process_id.as_str()) {
        return Ok(());
    }
    if step.hydration_failed.as_deref() == Some(action.process_id.as_str()) {
        step.hydration_failed = None;
        let request = HydrationRequest {
            step_id: step_id.to_string(),
            process_id: action.process_id.clone(),
            result_files: action.result_files.clone(),
            post: PostProcess::for_action(&action.name),
        };
        apply_hydration(&mut view, &request, fetched);
    } else {
        step.result = fetched.result;
        step.download_url = fetched.download_url;
    }
    Ok(())
}

/// Drop and fetch again a step's result or download link.
pub async fn refresh_step_result(
    api: &dyn PreingestApi,
    session: &SharedSession,
    step_id: &str,
) -> Result<()> {
    if let Some(step) = session.lock().await.step_mut(step_id) {
        step.clear_result();
    }
    load_step_result(api, session, step_id).await
}
