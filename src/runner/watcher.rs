//! Keeping a session view in sync with the server.
//!
//! The watcher polls the collection snapshot on an interval and accepts
//! partial snapshots pushed through a channel; both feed the same
//! reconciliation. A faster tick rederives the view so durations of running
//! actions keep moving between polls.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{CollectionPatch, PreingestApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{SessionView, SharedSession};
use crate::steps::StepStatus;
use crate::ui::UserInterface;

use super::hydrate::hydrate;
use super::reconcile::{reconcile, reconcile_current, ReconcileOutcome};

/// Polls and reconciles one session until stopped.
pub struct Watcher {
    api: Arc<dyn PreingestApi>,
    session: SharedSession,
    poll_interval: Duration,
    tick_interval: Duration,
    cancel: CancellationToken,
}

impl Watcher {
    pub fn new(api: Arc<dyn PreingestApi>, session: SharedSession, config: &ClientConfig) -> Self {
        Self {
            api,
            session,
            poll_interval: config.poll_interval(),
            tick_interval: config.tick_interval(),
            cancel: CancellationToken::new(),
        }
    }

    /// A token that stops the watcher when cancelled.
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the watcher. Results still in flight are discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run until stopped.
    ///
    /// Status changes are reported as messages and unexpected plan failures
    /// as warnings. Failed polls are logged and retried on the next interval.
    pub async fn run(
        &self,
        ui: &mut dyn UserInterface,
        mut patches: Option<mpsc::Receiver<CollectionPatch>>,
    ) {
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = poll.tick() => {
                    if let Err(e) = self.poll_once(ui).await {
                        if e.is_transient() {
                            debug!(error = %e, "collection poll failed");
                        } else {
                            warn!(error = %e, "collection poll failed");
                        }
                    }
                }
                Some(patch) = recv_patch(patches.as_mut()) => {
                    self.apply_patch(patch, ui).await;
                }
                _ = tick.tick() => {
                    let outcome = reconcile_current(&mut *self.session.lock().await, Utc::now());
                    self.finish(outcome, ui).await;
                }
            }
        }
        debug!("watcher stopped");
    }

    /// Fetch the snapshot once and reconcile it.
    pub async fn poll_once(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let session_id = self.session.lock().await.session_id().to_string();
        let snapshot = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            snapshot = self.api.get_collection(&session_id) => snapshot?,
        };

        let outcome = {
            let mut view = self.session.lock().await;
            let before = statuses(&view);
            let outcome = reconcile(&mut view, snapshot, Utc::now());
            report_changes(&before, &view, ui);
            outcome
        };
        self.finish(outcome, ui).await;
        Ok(())
    }

    /// Merge a pushed partial snapshot and reconcile.
    pub async fn apply_patch(&self, patch: CollectionPatch, ui: &mut dyn UserInterface) {
        let outcome = {
            let mut view = self.session.lock().await;
            if patch.session_id != view.session_id() {
                debug!(session_id = %patch.session_id, "ignoring update for another session");
                return;
            }
            let before = statuses(&view);
            view.collection.apply_patch(patch);
            let outcome = reconcile_current(&mut view, Utc::now());
            report_changes(&before, &view, ui);
            outcome
        };
        self.finish(outcome, ui).await;
    }

    async fn finish(&self, outcome: ReconcileOutcome, ui: &mut dyn UserInterface) {
        if self.cancel.is_cancelled() {
            return;
        }
        for alert in &outcome.alerts {
            ui.warning(&format!(
                "Execution plan aborted: {} ({}) failed",
                alert.step_id, alert.action_name
            ));
        }
        if !outcome.hydrations.is_empty() {
            hydrate(self.api.as_ref(), &self.session, outcome.hydrations).await;
        }
    }
}

async fn recv_patch(
    patches: Option<&mut mpsc::Receiver<CollectionPatch>>,
) -> Option<CollectionPatch> {
    match patches {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn statuses(view: &SessionView) -> Vec<Option<StepStatus>> {
    view.steps.iter().map(|s| s.status).collect()
}

fn report_changes(before: &[Option<StepStatus>], view: &SessionView, ui: &mut dyn UserInterface) {
    for (step, previous) in view.steps.iter().zip(before) {
        if step.status != *previous {
            if let Some(status) = step.status {
                ui.message(&format!("{} {}: {}", status.display_char(), step.id(), status));
            }
        }
    }
}
