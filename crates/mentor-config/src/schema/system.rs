//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing_subscriber` filter directive for the mentor crates.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "mentor=trace",
            LogLevel::Debug => "mentor=debug",
            LogLevel::Info => "mentor=info",
            LogLevel::Warn => "mentor=warn",
            LogLevel::Error => "mentor=error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
