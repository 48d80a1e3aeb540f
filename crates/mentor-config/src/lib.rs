//! Mentor configuration system.
//!
//! TOML-based configuration with validation. Every section uses serde
//! defaults so a partial file (or none at all) works out of the box. The
//! AI credential is never read from this file; it comes from the
//! environment.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{AiConfig, LogLevel, LoggingConfig, MentorConfig, StorageConfig};

use mentor_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path, or from the platform default path
/// when `path` is `None`.
///
/// The default path is created with a commented template if missing. An
/// explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<MentorConfig, ConfigError> {
    let config = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::FileNotFound(p.to_path_buf()));
            }
            toml_loader::load_from_path(p)?
        }
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}
