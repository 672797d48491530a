//! Step catalog validation rules.
//!
//! Errors make a catalog unusable:
//! - ids must be unique
//! - action names must be unique
//! - no circular dependencies
//!
//! Warnings are tolerated at runtime (unknown references contribute
//! nothing) but reported by `preingest lint`:
//! - `depends_on` entries must name known steps
//! - `lock_steps` entries must name known steps

use std::collections::HashSet;
use std::fmt;

use crate::error::{PreingestError, Result};
use crate::runner::dependency::find_cycle;

use super::definition::StepDefinition;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Validation finding with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    pub severity: Severity,
    /// Human-readable error message
    pub message: String,
    /// Step id if the finding is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, severity: Severity, message: String, step: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            message,
            step: step.map(str::to_string),
        }
    }
}

/// Validate step definitions and return all findings.
pub fn validate_steps(steps: &[StepDefinition]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let ids: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();

    let mut seen_ids = HashSet::new();
    let mut seen_actions = HashSet::new();
    for step in steps {
        if !seen_ids.insert(step.id.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-id",
                Severity::Error,
                format!("Step id '{}' is defined more than once", step.id),
                Some(&step.id),
            ));
        }
        if !seen_actions.insert(step.action_name.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-action",
                Severity::Error,
                format!(
                    "Action '{}' of step '{}' is already used by another step",
                    step.action_name, step.id
                ),
                Some(&step.id),
            ));
        }

        for dep in &step.depends_on {
            if !ids.contains(dep.as_str()) {
                errors.push(ValidationError::new(
                    "unknown-dependency",
                    Severity::Warning,
                    format!("Step '{}' depends on '{}' which does not exist", step.id, dep),
                    Some(&step.id),
                ));
            }
        }

        for locked in &step.lock_steps {
            if !ids.contains(locked.as_str()) {
                errors.push(ValidationError::new(
                    "unknown-lock-step",
                    Severity::Warning,
                    format!("Step '{}' locks '{}' which does not exist", step.id, locked),
                    Some(&step.id),
                ));
            }
        }
    }

    if let Some(cycle) = find_cycle(steps) {
        errors.push(ValidationError::new(
            "circular-dependency",
            Severity::Error,
            format!("Circular dependency detected: {}", cycle.join(" -> ")),
            cycle.first().map(String::as_str),
        ));
    }

    errors
}

/// Validate and return Result, failing on error-level findings only.
///
/// A cycle is reported as `CircularDependency`; other errors as
/// `ConfigValidationError`.
pub fn validate(steps: &[StepDefinition]) -> Result<()> {
    if let Some(cycle) = find_cycle(steps) {
        return Err(PreingestError::CircularDependency {
            cycle: cycle.join(" -> "),
        });
    }

    let errors: Vec<_> = validate_steps(steps)
        .into_iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(PreingestError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
