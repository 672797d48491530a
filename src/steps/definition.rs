//! Static step definitions.
//!
//! A [`StepDefinition`] describes one server-side handler the user can
//! select: what it depends on, which settings it needs, and how the server
//! should treat it inside an execution plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{SettingsKey, WorkflowItem};

/// A conditional requirement: when the declaring key holds `value`, the
/// listed settings are required too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentSetting {
    pub value: String,
    #[serde(default)]
    pub required_settings: Vec<SettingsKey>,
}

/// One selectable step, as authored in the step catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Stable identity used in dependency references.
    pub id: String,

    /// Matches the `name` of the server's actions. Unique per catalog.
    pub action_name: String,

    /// Short description for listings.
    #[serde(default)]
    pub description: String,

    /// Longer help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,

    /// Steps whose results this step builds on. Not enforced by the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Settings that need a value before the step may run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_settings: Vec<SettingsKey>,

    /// Settings required only when another setting holds a specific value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependent_settings: BTreeMap<SettingsKey, Vec<DependentSetting>>,

    /// Steps that can no longer be selected once this one succeeded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lock_steps: Vec<String>,

    /// Whether the step may be selected again after a successful run.
    #[serde(default)]
    pub allow_restart: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_on_error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_failed: Option<bool>,
}

impl StepDefinition {
    /// Create a minimal definition; handy for tests and ad-hoc catalogs.
    pub fn new(id: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_name: action_name.into(),
            description: String::new(),
            info: None,
            depends_on: Vec::new(),
            required_settings: Vec::new(),
            dependent_settings: BTreeMap::new(),
            lock_steps: Vec::new(),
            allow_restart: false,
            start_on_error: None,
            continue_on_error: None,
            continue_on_failed: None,
        }
    }

    pub fn with_depends_on(mut self, ids: &[&str]) -> Self {
        self.depends_on = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_required_settings(mut self, keys: &[SettingsKey]) -> Self {
        self.required_settings = keys.to_vec();
        self
    }

    pub fn with_dependent_setting(
        mut self,
        key: SettingsKey,
        value: impl Into<String>,
        required: &[SettingsKey],
    ) -> Self {
        self.dependent_settings
            .entry(key)
            .or_default()
            .push(DependentSetting {
                value: value.into(),
                required_settings: required.to_vec(),
            });
        self
    }

    pub fn with_lock_steps(mut self, ids: &[&str]) -> Self {
        self.lock_steps = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn restartable(mut self) -> Self {
        self.allow_restart = true;
        self
    }

    /// The plan entry for this step, applying the server's defaults:
    /// start and continue on error, stop on failure.
    pub fn workflow_item(&self) -> WorkflowItem {
        WorkflowItem {
            action_name: self.action_name.clone(),
            status: None,
            start_on_error: self.start_on_error.unwrap_or(true),
            continue_on_error: self.continue_on_error.unwrap_or(true),
            continue_on_failed: self.continue_on_failed.unwrap_or(false),
        }
    }
}
