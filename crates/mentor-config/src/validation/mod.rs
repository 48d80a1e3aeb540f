//! Configuration validation.
//!
//! Each check pushes a message into a shared list; all problems are
//! reported together in a single `ConfigError`.

mod helpers;


use crate::schema::MentorConfig;
use helpers::{validate_range, validate_range_f64};
use mentor_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MentorConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.ai.model.trim().is_empty() {
        errors.push("ai.model must not be empty".to_string());
    }
    validate_range_f64(&mut errors, "ai.temperature", config.ai.temperature, 0.0, 2.0);
    validate_range(&mut errors, "ai.max_tokens", config.ai.max_tokens, 1, 65536);

    let key = &config.storage.key;
    if key.is_empty() {
        errors.push("storage.key must not be empty".to_string());
    } else if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(format!(
            "storage.key = {key:?} may only contain ASCII letters, digits, '_' and '-'"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
