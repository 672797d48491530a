//! Merging a collection snapshot into the local step view.
//!
//! Reconciliation is pure: it reads the snapshot and the previous derived
//! state, writes the new derived state, and reports what the caller should
//! do next (notices to show, results to fetch). Applying the same snapshot
//! twice yields no further alerts and no further fetches.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::api::{ActionStatus, Collection, WorkflowItemStatus};
use crate::session::SessionView;
use crate::steps::{Step, StepStatus};
use crate::ui::format_duration;

use super::hydrate::{HydrationRequest, PostProcess};

/// A plan item finished with its handler failed while the step was last
/// seen in another state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub step_id: String,
    pub action_name: String,
    pub process_id: String,
}

/// What a reconciliation asks of its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub alerts: Vec<Alert>,
    pub hydrations: Vec<HydrationRequest>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty() && self.hydrations.is_empty()
    }
}

/// Replace the view's snapshot and rederive every step.
pub fn reconcile(view: &mut SessionView, snapshot: Collection, now: DateTime<Utc>) -> ReconcileOutcome {
    view.collection.refresh_from(snapshot);
    reconcile_current(view, now)
}

/// Rederive every step from the snapshot already held by the view.
///
/// Used after a pushed patch has been merged in place.
pub fn reconcile_current(view: &mut SessionView, now: DateTime<Utc>) -> ReconcileOutcome {
    let SessionView { collection, steps } = view;
    let mut outcome = ReconcileOutcome::default();

    for step in steps.iter_mut() {
        derive_step(step, collection, now, &mut outcome);
    }
    apply_selection_locks(steps);

    if !outcome.is_empty() {
        debug!(
            session_id = %collection.session_id,
            alerts = outcome.alerts.len(),
            hydrations = outcome.hydrations.len(),
            "reconciled snapshot"
        );
    }
    outcome
}

fn derive_step(
    step: &mut Step,
    collection: &Collection,
    now: DateTime<Utc>,
    outcome: &mut ReconcileOutcome,
) {
    let previous = step.status;
    let last_action = collection.last_action(step.action_name());
    let scheduled = collection
        .scheduled(step.action_name())
        .and_then(|w| w.status);
    let plan_done = scheduled == Some(WorkflowItemStatus::Done);

    if let Some(action) = last_action {
        if plan_done
            && action.action_status == ActionStatus::Failed
            && previous.is_some_and(|s| s != StepStatus::Failed)
        {
            warn!(step_id = %step.id(), action = %action.name, "plan item failed");
            outcome.alerts.push(Alert {
                step_id: step.id().to_string(),
                action_name: action.name.clone(),
                process_id: action.process_id.clone(),
            });
        }
    }

    if step.selected
        && matches!(previous, Some(StepStatus::Pending | StepStatus::Executing))
        && plan_done
    {
        step.selected = false;
    }

    if let Some(hold) = &step.hold {
        let newer_action = last_action
            .is_some_and(|a| Some(a.process_id.as_str()) != hold.previous_process_id.as_deref());
        let picked_up = scheduled.is_some() && !plan_done;
        if newer_action || picked_up {
            step.hold = None;
        }
    }

    let derived = scheduled
        .and_then(StepStatus::from_plan)
        .or_else(|| last_action.map(|a| a.action_status.into()));
    if step.hold.is_none() && step.status != Some(StepStatus::Wait) {
        step.status = derived;
    }

    if let Some(action) = last_action {
        let summary = action.summary.as_ref();
        let start = summary.and_then(|s| s.start).unwrap_or(action.creation);
        let end = summary.and_then(|s| s.end).unwrap_or(now);
        step.last_start = Some(start);
        step.last_duration = Some(format_duration(start, end));
        step.last_action = Some(action.clone());

        let settled = scheduled.is_none() || plan_done;
        let unseen = step.last_action_process_id.as_deref() != Some(action.process_id.as_str());
        if settled && unseen && action.action_status.is_terminal() {
            step.last_action_process_id = Some(action.process_id.clone());
            step.hydration_failed = None;
            step.clear_result();
            let post = PostProcess::for_action(&action.name);
            if post.fetches_result() {
                outcome.hydrations.push(HydrationRequest {
                    step_id: step.id().to_string(),
                    process_id: action.process_id.clone(),
                    result_files: action.result_files.clone(),
                    post,
                });
            }
        }
    } else if step.last_action.is_some() {
        step.last_action = None;
        step.last_action_process_id = None;
        step.hydration_failed = None;
        step.last_duration = None;
        step.clear_result();
    }
}

/// Pin completed steps that may not run again, and the steps they lock.
fn apply_selection_locks(steps: &mut [Step]) {
    let locked_by_success: HashSet<String> = steps
        .iter()
        .filter(|s| s.status == Some(StepStatus::Success))
        .flat_map(|s| s.definition.lock_steps.iter().cloned())
        .collect();

    for step in steps.iter_mut() {
        let completed = step.status == Some(StepStatus::Success) && !step.definition.allow_restart;
        step.fixed_selected = if completed || locked_by_success.contains(step.id()) {
            Some(false)
        } else {
            None
        };
        step.selected = step.fixed_selected.unwrap_or(step.selected);
    }
}
