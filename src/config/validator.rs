//! Configuration validation rules.
//!
//! - `api_url` must be an http(s) URL
//! - intervals and budgets must be non-zero
//! - the retry delay must fit inside the step budget

use crate::config::schema::ClientConfig;
use crate::error::{PreingestError, Result};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &ClientConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !(config.api_url.starts_with("http://") || config.api_url.starts_with("https://")) {
        errors.push(ValidationError::new(
            "invalid-api-url",
            format!("api_url '{}' must start with http:// or https://", config.api_url),
        ));
    }

    for (name, value) in [
        ("poll_interval_ms", config.poll_interval_ms),
        ("tick_interval_ms", config.tick_interval_ms),
        ("step_max_seconds", config.step_max_seconds),
        ("request_timeout_secs", config.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(
                "zero-interval",
                format!("{} must be greater than zero", name),
            ));
        }
    }

    if config.retry_delay_ms / 1000 >= config.step_max_seconds && config.step_max_seconds > 0 {
        errors.push(ValidationError::new(
            "retry-exceeds-budget",
            format!(
                "retry_delay_ms ({}) leaves no room for a second attempt within step_max_seconds ({})",
                config.retry_delay_ms, config.step_max_seconds
            ),
        ));
    }

    errors
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &ClientConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(PreingestError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
