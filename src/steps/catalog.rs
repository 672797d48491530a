//! The ordered list of step definitions a session works with.
//!
//! Definition order matters: plans are built and sequential runs proceed in
//! this order.

use std::fs;
use std::path::Path;

use crate::error::{PreingestError, Result};

use super::definition::StepDefinition;
use super::state::Step;
use super::validator::validate;

const BUILTIN_STEPS: &str = include_str!("builtin.yml");

/// A validated, ordered set of step definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct StepCatalog {
    steps: Vec<StepDefinition>,
}

impl StepCatalog {
    /// Build a catalog, rejecting duplicate ids or action names and cycles.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        validate(&steps)?;
        Ok(Self { steps })
    }

    /// The catalog shipped with the client.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_STEPS, Path::new("<builtin>"))
    }

    /// Parse a YAML list of step definitions.
    pub fn from_yaml(content: &str, source_path: &Path) -> Result<Self> {
        let steps: Vec<StepDefinition> =
            serde_yaml::from_str(content).map_err(|e| PreingestError::ConfigParseError {
                path: source_path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(steps)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PreingestError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PreingestError::Io(e)
            }
        })?;
        Self::from_yaml(&content, path)
    }

    /// Parse step definitions without validating them, for linting.
    pub fn parse_unchecked(content: &str, source_path: &Path) -> Result<Vec<StepDefinition>> {
        serde_yaml::from_str(content).map_err(|e| PreingestError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Raw built-in catalog text.
    pub fn builtin_source() -> &'static str {
        BUILTIN_STEPS
    }

    pub fn definitions(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn get(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn by_action(&self, action_name: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.action_name == action_name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fresh runtime steps, one per definition, in catalog order.
    pub fn instantiate(&self) -> Vec<Step> {
        self.steps.iter().cloned().map(Step::new).collect()
    }
}
