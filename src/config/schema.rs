//! Configuration schema for the pre-ingest client.
//!
//! This module contains the struct that maps to `.preingest/config.yml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `.preingest/config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the pre-ingest API, including the trailing `api/`.
    pub api_url: String,

    /// How often the watcher fetches a fresh snapshot.
    pub poll_interval_ms: u64,

    /// How often the watcher re-derives step state (timing display).
    pub tick_interval_ms: u64,

    /// Maximum time to wait for a triggered step to finish.
    pub step_max_seconds: u64,

    /// Fixed delay between polls while waiting for a triggered step.
    pub retry_delay_ms: u64,

    /// Timeout for a single HTTP request.
    pub request_timeout_secs: u64,

    /// Step catalog replacing the built-in one (relative to project root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: 2000,
            tick_interval_ms: 500,
            step_max_seconds: 600,
            retry_delay_ms: 500,
            request_timeout_secs: 30,
            steps_file: None,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn step_max(&self) -> Duration {
        Duration::from_secs(self.step_max_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_api_url() -> String {
    "http://localhost:8000/api/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_conventions() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api/");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.step_max(), Duration::from_secs(600));
        assert_eq!(config.retry_delay(), Duration::from_millis(500));
        assert!(config.steps_file.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: ClientConfig =
            serde_yaml::from_str("api_url: http://preingest:9000/api/\nstep_max_seconds: 60")
                .unwrap();
        assert_eq!(config.api_url, "http://preingest:9000/api/");
        assert_eq!(config.step_max_seconds, 60);
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn steps_file_is_omitted_when_unset() {
        let yaml = serde_yaml::to_string(&ClientConfig::default()).unwrap();
        assert!(!yaml.contains("steps_file"));
    }
}
