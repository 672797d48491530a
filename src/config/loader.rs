//! Configuration file discovery and loading.
//!
//! A project keeps its settings in `.preingest/config.yml`. A missing
//! project config is not an error: the client then talks to a local
//! server with default timings. Environment variables override whatever
//! the file says.

use crate::config::schema::ClientConfig;
use crate::error::{PreingestError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the API base URL.
pub const ENV_API_URL: &str = "PREINGEST_API";
/// Overrides the snapshot poll interval, in milliseconds.
pub const ENV_POLL_INTERVAL: &str = "PREINGEST_POLL_INTERVAL_MS";
/// Overrides the maximum wait for a triggered step, in seconds.
pub const ENV_STEP_MAX_SECONDS: &str = "PREINGEST_STEP_MAX_SECONDS";

/// Location of the project config under a project root.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".preingest").join("config.yml")
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. `.preingest` directory (primary indicator)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(".preingest").is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PreingestError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PreingestError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`ClientConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ClientConfig> {
    if content.trim().is_empty() {
        return Ok(ClientConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| PreingestError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override, then apply environment
/// overrides.
///
/// If `config_override` is provided it must exist. Otherwise the project
/// config is used when present, else the defaults.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match config_override {
        Some(path) => load_config_file(path)?,
        None => {
            let path = project_config_path(project_root);
            if path.exists() {
                load_config_file(&path)?
            } else {
                tracing::debug!(path = %path.display(), "no project config, using defaults");
                ClientConfig::default()
            }
        }
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
        config.api_url = url;
    }
    if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
        config.poll_interval_ms = parse_number(ENV_POLL_INTERVAL, &raw)?;
    }
    if let Some(raw) = lookup(ENV_STEP_MAX_SECONDS) {
        config.step_max_seconds = parse_number(ENV_STEP_MAX_SECONDS, &raw)?;
    }
    Ok(())
}

fn parse_number(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| PreingestError::ConfigValidationError {
            message: format!("{} must be a whole number, got '{}'", name, raw),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn find_project_root_finds_preingest_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".preingest")).unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root(&nested).unwrap();
        assert_eq!(root, temp.path());
    }

    #[test]
    fn find_project_root_finds_git_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();

        assert_eq!(find_project_root(temp.path()).unwrap(), temp.path());
    }

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "poll_interval_ms: 1000").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/config.yml"));
        assert!(matches!(result, Err(PreingestError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("api_url: [", Path::new("test.yml"));
        assert!(matches!(result, Err(PreingestError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("\n", Path::new("test.yml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn load_config_uses_project_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".preingest");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "tick_interval_ms: 250").unwrap();

        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
    }

    #[test]
    fn load_config_without_project_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
    }

    #[test]
    fn load_config_with_missing_override_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("other.yml");
        let result = load_config(temp.path(), Some(&missing));
        assert!(matches!(result, Err(PreingestError::ConfigNotFound { .. })));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = ClientConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_API_URL, "http://server/api/"),
                (ENV_POLL_INTERVAL, "750"),
                (ENV_STEP_MAX_SECONDS, " 30 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_url, "http://server/api/");
        assert_eq!(config.poll_interval_ms, 750);
        assert_eq!(config.step_max_seconds, 30);
    }

    #[test]
    fn empty_api_override_is_ignored() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, env(&[(ENV_API_URL, "")])).unwrap();
        assert_eq!(config.api_url, ClientConfig::default().api_url);
    }

    #[test]
    fn invalid_number_override_is_rejected() {
        let mut config = ClientConfig::default();
        let result = apply_env_overrides(&mut config, env(&[(ENV_POLL_INTERVAL, "soon")]));
        assert!(matches!(
            result,
            Err(PreingestError::ConfigValidationError { .. })
        ));
    }
}
