//! Running queued steps one at a time.
//!
//! Each step marked `Wait` is triggered and awaited before the next one
//! starts. How a step is triggered is a [`StepTrigger`]; the default
//! [`PlanTrigger`] schedules a single-item plan and polls until a new action
//! for the step settles.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{repeat_until_result, ExecutionPlan, PreingestApi};
use crate::config::ClientConfig;
use crate::error::{PreingestError, Result};
use crate::session::SharedSession;
use crate::steps::{Step, StepStatus};
use crate::ui::UserInterface;

use super::hydrate::hydrate;
use super::reconcile::reconcile;

/// Starts one step and waits for it to settle.
#[async_trait]
pub trait StepTrigger: Send + Sync {
    /// Trigger the step and return its terminal status.
    async fn trigger(
        &self,
        api: &dyn PreingestApi,
        session: &SharedSession,
        step_id: &str,
    ) -> Result<StepStatus>;
}

/// Schedules the step as a single-item plan and polls the snapshot.
pub struct PlanTrigger {
    step_max: Duration,
    retry_delay: Duration,
}

impl PlanTrigger {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            step_max: config.step_max(),
            retry_delay: config.retry_delay(),
        }
    }

    /// Fetch and reconcile once; yield the status of a settled new action.
    async fn observe(
        &self,
        api: &dyn PreingestApi,
        session: &SharedSession,
        session_id: &str,
        step_id: &str,
        previous_process_id: Option<&str>,
    ) -> Result<Option<StepStatus>> {
        let snapshot = api.get_collection(session_id).await?;
        let (outcome, settled) = {
            let mut view = session.lock().await;
            let outcome = reconcile(&mut view, snapshot, Utc::now());
            let settled = view
                .step(step_id)
                .and_then(|s| s.last_action.as_ref())
                .filter(|a| Some(a.process_id.as_str()) != previous_process_id)
                .filter(|a| a.action_status.is_terminal())
                .map(|a| StepStatus::from(a.action_status));
            (outcome, settled)
        };
        hydrate(api, session, outcome.hydrations).await;
        Ok(settled)
    }
}

#[async_trait]
impl StepTrigger for PlanTrigger {
    async fn trigger(
        &self,
        api: &dyn PreingestApi,
        session: &SharedSession,
        step_id: &str,
    ) -> Result<StepStatus> {
        let (session_id, item, previous) = {
            let view = session.lock().await;
            let step = view.step(step_id).ok_or_else(|| PreingestError::UnknownStep {
                id: step_id.to_string(),
            })?;
            (
                view.session_id().to_string(),
                step.definition.workflow_item(),
                step.last_action.as_ref().map(|a| a.process_id.clone()),
            )
        };

        let plan = ExecutionPlan {
            workflow: vec![item],
        };
        api.start_execution_plan(&session_id, &plan).await?;
        debug!(step_id, session_id = %session_id, "single-step plan submitted");

        repeat_until_result(
            move || {
                let session_id = session_id.clone();
                let previous = previous.clone();
                async move {
                    self.observe(api, session, &session_id, step_id, previous.as_deref())
                        .await
                }
            },
            self.step_max,
            self.retry_delay,
        )
        .await
    }
}

/// Per-step trigger overrides on top of a default.
pub struct TriggerRegistry {
    default: Arc<dyn StepTrigger>,
    overrides: HashMap<String, Arc<dyn StepTrigger>>,
}

impl TriggerRegistry {
    pub fn new(default: Arc<dyn StepTrigger>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Use `trigger` for the step with the given id.
    pub fn register(&mut self, step_id: impl Into<String>, trigger: Arc<dyn StepTrigger>) {
        self.overrides.insert(step_id.into(), trigger);
    }

    pub fn resolve(&self, step_id: &str) -> Arc<dyn StepTrigger> {
        self.overrides
            .get(step_id)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }
}

/// Outcome of a sequential run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Terminal status of every triggered step, in run order.
    pub completed: Vec<(String, StepStatus)>,
    /// The completion callback stopped the run.
    pub halted: bool,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.completed
            .iter()
            .all(|(_, status)| *status == StepStatus::Success)
    }
}

/// Called with each step after it settles; `false` stops the run.
pub type CompletionCallback<'a> = &'a mut (dyn FnMut(&Step) -> bool + Send);

/// Triggers queued steps one after another.
pub struct SequentialDriver {
    api: Arc<dyn PreingestApi>,
    session: SharedSession,
    triggers: TriggerRegistry,
}

impl SequentialDriver {
    pub fn new(api: Arc<dyn PreingestApi>, session: SharedSession, triggers: TriggerRegistry) -> Self {
        Self {
            api,
            session,
            triggers,
        }
    }

    /// Run every `Wait` step in list order.
    ///
    /// A trigger error marks the step `Failed` and raises an error notice;
    /// the run continues unless the callback says otherwise. When halted,
    /// steps still queued are released to the server-derived status.
    pub async fn run_waiting(
        &self,
        ui: &mut dyn UserInterface,
        mut on_complete: Option<CompletionCallback<'_>>,
    ) -> Result<RunSummary> {
        let step_ids: Vec<String> = {
            let view = self.session.lock().await;
            view.steps.iter().map(|s| s.id().to_string()).collect()
        };
        let mut summary = RunSummary::default();

        for step_id in step_ids {
            {
                let mut view = self.session.lock().await;
                let Some(step) = view.step_mut(&step_id) else {
                    continue;
                };
                if step.status != Some(StepStatus::Wait) {
                    continue;
                }
                step.hold_status(StepStatus::Executing);
            }

            info!(step_id = %step_id, "triggering step");
            let trigger = self.triggers.resolve(&step_id);
            let result = trigger
                .trigger(self.api.as_ref(), &self.session, &step_id)
                .await;

            let mut view = self.session.lock().await;
            let Some(step) = view.step_mut(&step_id) else {
                continue;
            };
            let status = match result {
                Ok(status) => {
                    step.hold = None;
                    step.status = Some(status);
                    let duration = step.last_duration.as_deref().unwrap_or("-");
                    if status == StepStatus::Success {
                        ui.success(&format!("{}: {} ({})", step_id, status, duration));
                    } else {
                        ui.warning(&format!("{}: {} ({})", step_id, status, duration));
                    }
                    status
                }
                Err(e) => {
                    warn!(step_id = %step_id, error = %e, "step trigger failed");
                    step.hold = None;
                    step.status = Some(StepStatus::Failed);
                    ui.error(&format!("{}: {}", step_id, e));
                    StepStatus::Failed
                }
            };
            summary.completed.push((step_id.clone(), status));

            if let Some(callback) = on_complete.as_deref_mut() {
                if !callback(step) {
                    release_queued(&mut view.steps);
                    summary.halted = true;
                    ui.warning("Processing halted");
                    break;
                }
            }
        }

        Ok(summary)
    }
}

/// Drop the local `Wait` of steps that will not be triggered.
fn release_queued(steps: &mut [Step]) {
    for step in steps
        .iter_mut()
        .filter(|s| s.status == Some(StepStatus::Wait))
    {
        step.hold = None;
        step.status = step.last_action.as_ref().map(|a| a.action_status.into());
    }
}
