//! Runtime view of a step within one session.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::api::{Action, ActionResult, ActionStatus, WorkflowItemStatus};

use super::definition::StepDefinition;

/// Displayed status of a step.
///
/// `Wait` is local only: the sequential driver queued the step but has not
/// triggered it yet. The server never reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Queued locally, not yet triggered.
    Wait,

    /// Scheduled in the server's plan.
    Pending,

    /// Currently running on the server.
    Executing,

    /// Completed successfully.
    Success,

    /// Completed with errors in the processed material.
    Error,

    /// The handler itself failed.
    Failed,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Success | StepStatus::Error | StepStatus::Failed
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Wait => '…',
            StepStatus::Pending => '○',
            StepStatus::Executing => '◉',
            StepStatus::Success => '✓',
            StepStatus::Error => '!',
            StepStatus::Failed => '✗',
        }
    }

    /// Map a plan item status; `Done` has no displayed equivalent.
    pub fn from_plan(status: WorkflowItemStatus) -> Option<Self> {
        match status {
            WorkflowItemStatus::Pending => Some(StepStatus::Pending),
            WorkflowItemStatus::Executing => Some(StepStatus::Executing),
            WorkflowItemStatus::Done => None,
        }
    }
}

impl From<ActionStatus> for StepStatus {
    fn from(status: ActionStatus) -> Self {
        match status {
            ActionStatus::Executing => StepStatus::Executing,
            ActionStatus::Success => StepStatus::Success,
            ActionStatus::Error => StepStatus::Error,
            ActionStatus::Failed => StepStatus::Failed,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Wait => "Wait",
            StepStatus::Pending => "Pending",
            StepStatus::Executing => "Executing",
            StepStatus::Success => "Success",
            StepStatus::Error => "Error",
            StepStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// A locally set status that outranks the action history until the server
/// shows something newer.
///
/// Set when the sequential driver queues or triggers a step: at that moment
/// the history still holds the previous run, which must not overwrite the
/// local `Wait`/`Executing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerHold {
    /// Process id of the last action known when the hold was taken.
    pub previous_process_id: Option<String>,
}

/// One step's derived state, recomputed on every reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub definition: StepDefinition,

    pub status: Option<StepStatus>,

    /// User intent; cleared by the reconciler on completion or lock.
    pub selected: bool,

    /// `Some(false)` pins the step to unselected.
    pub fixed_selected: Option<bool>,

    pub last_action: Option<Action>,

    /// Identity of the action whose result is cached.
    pub last_action_process_id: Option<String>,

    /// Process id whose eager result fetch failed; loaded on demand instead.
    pub hydration_failed: Option<String>,

    pub last_start: Option<DateTime<Utc>>,

    /// Formatted elapsed time, like `1:02.03`.
    pub last_duration: Option<String>,

    /// Lazily fetched result of `last_action`.
    pub result: Option<ActionResult>,

    /// Download URL for a binary result of `last_action`.
    pub download_url: Option<String>,

    pub hold: Option<TriggerHold>,
}

impl Step {
    pub fn new(definition: StepDefinition) -> Self {
        Self {
            definition,
            status: None,
            selected: false,
            fixed_selected: None,
            last_action: None,
            last_action_process_id: None,
            hydration_failed: None,
            last_start: None,
            last_duration: None,
            result: None,
            download_url: None,
            hold: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn action_name(&self) -> &str {
        &self.definition.action_name
    }

    /// Whether the user may change the selection.
    pub fn is_selectable(&self) -> bool {
        self.fixed_selected.is_none()
    }

    /// Set a local status and hold it against the current history.
    pub fn hold_status(&mut self, status: StepStatus) {
        self.status = Some(status);
        self.hold = Some(TriggerHold {
            previous_process_id: self.last_action.as_ref().map(|a| a.process_id.clone()),
        });
    }

    /// Drop cached result detail.
    pub fn clear_result(&mut self) {
        self.result = None;
        self.download_url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(StepStatus::Success.is_terminal());
        assert!(StepStatus::Error.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(!StepStatus::Wait.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Executing.is_terminal());
    }

    #[test]
    fn done_plan_status_has_no_display() {
        assert_eq!(StepStatus::from_plan(WorkflowItemStatus::Done), None);
        assert_eq!(
            StepStatus::from_plan(WorkflowItemStatus::Executing),
            Some(StepStatus::Executing)
        );
    }

    #[test]
    fn hold_records_previous_process_id() {
        let mut step = Step::new(StepDefinition::new("unpack", "UnpackTarHandler"));
        step.last_action = Some(Action {
            action_status: ActionStatus::Success,
            creation: Utc::now(),
            name: "UnpackTarHandler".into(),
            result_files: vec![],
            process_id: "p1".into(),
            summary: None,
            description: None,
        });
        step.hold_status(StepStatus::Wait);
        assert_eq!(step.status, Some(StepStatus::Wait));
        assert_eq!(
            step.hold.as_ref().unwrap().previous_process_id.as_deref(),
            Some("p1")
        );
    }

    #[test]
    fn new_step_is_selectable() {
        let step = Step::new(StepDefinition::new("unpack", "UnpackTarHandler"));
        assert!(step.is_selectable());
        assert!(!step.selected);
        assert!(step.status.is_none());
    }
}
