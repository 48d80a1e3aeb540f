//! AI provider settings.

use serde::{Deserialize, Serialize};

/// Settings passed to the conversation capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    /// Creativity (valid range: 0.0-2.0).
    pub temperature: f64,
    /// Valid range: 1-65536.
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.8,
            max_tokens: 4096,
        }
    }
}
