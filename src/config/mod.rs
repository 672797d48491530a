//! Configuration loading, parsing, and validation for the client.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use preingest::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".preingest");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "tick_interval_ms: 250").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.tick_interval_ms, 250);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_env_overrides, find_project_root, load_config, load_config_file, parse_config,
    project_config_path, ENV_API_URL, ENV_POLL_INTERVAL, ENV_STEP_MAX_SECONDS,
};
pub use schema::ClientConfig;
pub use validator::{validate, validate_config, ValidationError};
