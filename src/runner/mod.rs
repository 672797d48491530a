//! Workflow reconciliation and execution.
//!
//! - [`dependency`] - transitive dependencies and dependents of steps
//! - [`settings`] - required, missing and locked settings
//! - [`reconcile`] - merging snapshots into the step view
//! - [`hydrate`] - fetching result detail of completed actions
//! - [`watcher`] - polling and pushed updates
//! - [`plan`] - server-side plan submission
//! - [`sequential`] - one-step-at-a-time execution

pub mod dependency;
pub mod hydrate;
pub mod plan;
pub mod reconcile;
pub mod sequential;
pub mod settings;
pub mod watcher;

pub use dependency::{dependencies, dependents, find_cycle, DependentItem};
pub use hydrate::{
    apply_hydration, fetch_step_result, hydrate, load_step_result, refresh_step_result,
    HydrationRequest, PostProcess, StepResult,
};
pub use plan::{start_plan, update_settings};
pub use reconcile::{reconcile, reconcile_current, Alert, ReconcileOutcome};
pub use sequential::{
    CompletionCallback, PlanTrigger, RunSummary, SequentialDriver, StepTrigger, TriggerRegistry,
};
pub use watcher::Watcher;
