//! Shared helpers for integration tests.
//!
//! [`ScriptedApi`] is an in-memory pre-ingest server. Submitted plans move
//! forward one phase per snapshot fetch: a pending item starts executing
//! (appending an `Executing` action), then finishes with the outcome
//! scripted for its handler.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use preingest::api::{
    Action, ActionResult, ActionStatus, Collection, ExecutionPlan, PreingestApi, ServerFile,
    Settings, TriggerActionResult, WorkflowItemStatus,
};
use preingest::config::ClientConfig;
use preingest::runner::reconcile;
use preingest::session::{shared, SessionView, SharedSession};
use preingest::steps::StepCatalog;
use preingest::{PreingestError, Result};

pub const SESSION: &str = "7a3f-s1";

#[derive(Default)]
struct ServerState {
    collection: Collection,
    outcomes: HashMap<String, ActionStatus>,
    stalled: HashSet<String>,
    results: HashMap<String, ActionResult>,
    result_fetches: usize,
    plans: Vec<ExecutionPlan>,
    saved: Vec<Settings>,
    cancels: usize,
    resets: usize,
    removed: bool,
    failing_polls: usize,
    next_process: u32,
}

pub struct ScriptedApi {
    state: Mutex<ServerState>,
}

impl ScriptedApi {
    pub fn new(collection: Collection) -> Self {
        Self {
            state: Mutex::new(ServerState {
                collection,
                ..Default::default()
            }),
        }
    }

    /// Finish actions of `action_name` with `status` instead of `Success`.
    pub fn with_outcome(self, action_name: &str, status: ActionStatus) -> Self {
        self.lock().outcomes.insert(action_name.to_string(), status);
        self
    }

    /// Never finish actions of `action_name`.
    pub fn stalled(self, action_name: &str) -> Self {
        self.lock().stalled.insert(action_name.to_string());
        self
    }

    pub fn with_result(self, file: &str, result: ActionResult) -> Self {
        self.lock().results.insert(file.to_string(), result);
        self
    }

    /// Fail the next `count` snapshot fetches with a connection error.
    pub fn failing_polls(self, count: usize) -> Self {
        self.lock().failing_polls = count;
        self
    }

    pub fn into_shared(self) -> Arc<ScriptedApi> {
        Arc::new(self)
    }

    pub fn collection(&self) -> Collection {
        self.lock().collection.clone()
    }

    pub fn set_collection(&self, collection: Collection) {
        self.lock().collection = collection;
    }

    pub fn plans(&self) -> Vec<ExecutionPlan> {
        self.lock().plans.clone()
    }

    pub fn saved_settings(&self) -> Vec<Settings> {
        self.lock().saved.clone()
    }

    pub fn cancels(&self) -> usize {
        self.lock().cancels
    }

    /// Publish a result file after the session was opened.
    pub fn add_result(&self, file: &str, result: ActionResult) {
        self.lock().results.insert(file.to_string(), result);
    }

    /// Number of result fetches served or refused.
    pub fn result_fetches(&self) -> usize {
        self.lock().result_fetches
    }

    pub fn resets(&self) -> usize {
        self.lock().resets
    }

    pub fn removed(&self) -> bool {
        self.lock().removed
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }
}

impl ServerState {
    /// Move the first unfinished plan item one phase forward.
    fn advance(&mut self) {
        let Some(index) = self
            .collection
            .scheduled_plan
            .iter()
            .position(|w| w.status != Some(WorkflowItemStatus::Done))
        else {
            return;
        };
        let action_name = self.collection.scheduled_plan[index].action_name.clone();
        let at = self
            .collection
            .preingest
            .iter()
            .map(|a| a.creation)
            .max()
            .unwrap_or_else(|| clock(0))
            + Duration::minutes(1);

        match self.collection.scheduled_plan[index].status {
            Some(WorkflowItemStatus::Executing) => {
                if self.stalled.contains(&action_name) {
                    return;
                }
                let outcome = self
                    .outcomes
                    .get(&action_name)
                    .copied()
                    .unwrap_or(ActionStatus::Success);
                if let Some(action) = self
                    .collection
                    .preingest
                    .iter_mut()
                    .rev()
                    .find(|a| a.name == action_name)
                {
                    action.action_status = outcome;
                }
                self.collection.scheduled_plan[index].status = Some(WorkflowItemStatus::Done);
            }
            _ => {
                self.next_process += 1;
                let mut started = action(
                    &action_name,
                    ActionStatus::Executing,
                    self.next_process as i64 + 100,
                );
                started.creation = at;
                self.collection.preingest.push(started);
                self.collection.scheduled_plan[index].status = Some(WorkflowItemStatus::Executing);
            }
        }
    }
}

#[async_trait]
impl PreingestApi for ScriptedApi {
    async fn get_collections(&self) -> Result<Vec<Collection>> {
        Ok(vec![self.lock().collection.clone()])
    }

    async fn get_collection(&self, session_id: &str) -> Result<Collection> {
        let mut state = self.lock();
        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(PreingestError::Connection {
                message: "connection refused".into(),
            });
        }
        if session_id != state.collection.session_id || state.removed {
            return Err(PreingestError::NoSuchSession {
                session_id: session_id.to_string(),
            });
        }
        state.advance();
        Ok(state.collection.clone())
    }

    async fn submit_execution_plan(
        &self,
        session_id: &str,
        plan: &ExecutionPlan,
    ) -> Result<Option<TriggerActionResult>> {
        let mut state = self.lock();
        state.plans.push(plan.clone());
        state.collection.scheduled_plan = plan
            .workflow
            .iter()
            .cloned()
            .map(|mut item| {
                item.status = Some(WorkflowItemStatus::Pending);
                item
            })
            .collect();
        Ok(Some(TriggerActionResult {
            message: "Plan started".into(),
            session_id: session_id.to_string(),
            action_id: format!("plan-{}", state.plans.len()),
        }))
    }

    async fn cancel_execution_plan(&self, _session_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.cancels += 1;
        state.collection.scheduled_plan.clear();
        Ok(())
    }

    async fn get_action_result(&self, _session_id: &str, result_file: &str) -> Result<ActionResult> {
        let mut state = self.lock();
        state.result_fetches += 1;
        state
            .results
            .get(result_file)
            .cloned()
            .ok_or_else(|| PreingestError::Http {
                status: 404,
                path: result_file.to_string(),
                detail: "Not Found".into(),
            })
    }

    fn action_report_url(&self, session_id: &str, file: &str) -> String {
        format!("http://preingest.test/api/output/report/{}/{}", session_id, file)
    }

    async fn save_settings(&self, _session_id: &str, settings: &Settings) -> Result<()> {
        let mut state = self.lock();
        state.saved.push(settings.clone());
        state.collection.settings = settings.clone();
        Ok(())
    }

    async fn reset_session(&self, _session_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.resets += 1;
        state.collection.preingest.clear();
        Ok(())
    }

    async fn remove_session(&self, _session_id: &str) -> Result<()> {
        self.lock().removed = true;
        Ok(())
    }

    async fn list_stylesheets(&self) -> Result<Vec<ServerFile>> {
        Ok(vec![ServerFile {
            filename: "prewash-topx.xslt".into(),
            name: "prewash-topx".into(),
        }])
    }

    async fn list_schemas(&self) -> Result<Vec<ServerFile>> {
        Ok(vec![ServerFile {
            filename: "ToPX-2.3_2.xsd".into(),
            name: "ToPX-2.3_2".into(),
        }])
    }
}

/// A fixed point in time plus `minutes`.
pub fn clock(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn collection() -> Collection {
    Collection {
        name: "archive.tar".into(),
        session_id: SESSION.into(),
        creation_time: Some(clock(0)),
        size: 4096,
        ..Default::default()
    }
}

/// An action created at `clock(minute)` with a result file named after it.
pub fn action(name: &str, status: ActionStatus, minute: i64) -> Action {
    let result_file = match name {
        "ExcelCreatorHandler" => format!("{}.xlsx", name),
        _ => format!("{}.json", name),
    };
    Action {
        action_status: status,
        creation: clock(minute),
        name: name.to_string(),
        result_files: vec![result_file],
        process_id: format!("{}-{}", name, minute),
        summary: None,
        description: None,
    }
}

/// Timings short enough for tests.
pub fn fast_config() -> ClientConfig {
    ClientConfig {
        poll_interval_ms: 10,
        tick_interval_ms: 5,
        step_max_seconds: 5,
        retry_delay_ms: 1,
        ..Default::default()
    }
}

/// Open a session over the built-in catalog, reconciled with the server's
/// current snapshot.
pub async fn open(api: &ScriptedApi) -> SharedSession {
    open_with(api, StepCatalog::builtin().unwrap()).await
}

pub async fn open_with(api: &ScriptedApi, catalog: StepCatalog) -> SharedSession {
    let snapshot = api.get_collection(SESSION).await.unwrap();
    let mut view = SessionView::new(&catalog, snapshot.clone());
    reconcile(&mut view, snapshot, clock(60));
    shared(view)
}
