//! Local view of one collection and its steps.
//!
//! The reconciler and the drivers are the only writers of derived fields;
//! callers may change the selection and settings subject to the locks.

use std::collections::BTreeSet;

use crate::api::{Collection, ExecutionPlan, Settings, SettingsKey};
use crate::error::{PreingestError, Result};
use crate::runner::settings;
use crate::steps::{Step, StepCatalog, StepStatus};

/// A collection snapshot together with the derived state of every step.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub collection: Collection,
    pub steps: Vec<Step>,
}

impl SessionView {
    /// Start a view with fresh steps; nothing is derived until the first
    /// reconciliation.
    pub fn new(catalog: &StepCatalog, collection: Collection) -> Self {
        Self {
            collection,
            steps: catalog.instantiate(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.collection.session_id
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id() == id)
    }

    /// Change the user's selection of a step.
    ///
    /// # Errors
    ///
    /// `UnknownStep` for an id not in the catalog, `SelectionLocked` when
    /// selecting a step pinned by a completed step.
    pub fn select(&mut self, id: &str, selected: bool) -> Result<()> {
        let step = self
            .step_mut(id)
            .ok_or_else(|| PreingestError::UnknownStep { id: id.to_string() })?;
        if selected && step.fixed_selected == Some(false) {
            return Err(PreingestError::SelectionLocked { id: id.to_string() });
        }
        step.selected = step.fixed_selected.unwrap_or(selected);
        Ok(())
    }

    /// Select exactly the given steps, deselecting all others.
    pub fn select_only(&mut self, ids: &[String]) -> Result<()> {
        for id in ids {
            if self.step(id).is_none() {
                return Err(PreingestError::UnknownStep { id: id.clone() });
            }
        }
        for step in &mut self.steps {
            step.selected = false;
        }
        for id in ids {
            self.select(id, true)?;
        }
        Ok(())
    }

    /// Selected steps in definition order.
    pub fn selected_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.selected)
    }

    pub fn required_settings(&self, candidate: Option<&Settings>) -> BTreeSet<SettingsKey> {
        settings::required_settings(&self.steps, &self.collection.settings, candidate)
    }

    pub fn missing_settings(&self) -> BTreeSet<SettingsKey> {
        settings::missing_settings(&self.steps, &self.collection.settings)
    }

    pub fn locked_settings(&self, candidate: Option<&Settings>) -> BTreeSet<SettingsKey> {
        settings::locked_settings(&self.steps, &self.collection.settings, candidate)
    }

    /// Accept edited settings unless they change a locked value.
    ///
    /// The view is updated optimistically; persisting is up to the caller.
    pub fn apply_settings(&mut self, candidate: Settings) -> Result<()> {
        let changed =
            settings::locked_changes(&self.steps, &self.collection.settings, &candidate);
        if let Some(key) = changed.first() {
            return Err(PreingestError::SettingLocked { key: *key });
        }
        self.collection.settings = candidate;
        Ok(())
    }

    /// The plan for the selected steps, in definition order.
    pub fn build_plan(&self) -> ExecutionPlan {
        ExecutionPlan {
            workflow: self
                .selected_steps()
                .map(|s| s.definition.workflow_item())
                .collect(),
        }
    }

    /// Mark every selected step `Wait` for the sequential driver.
    ///
    /// Returns the number of queued steps.
    pub fn queue_selected(&mut self) -> usize {
        let mut queued = 0;
        for step in self.steps.iter_mut().filter(|s| s.selected) {
            step.hold_status(StepStatus::Wait);
            queued += 1;
        }
        queued
    }
}
