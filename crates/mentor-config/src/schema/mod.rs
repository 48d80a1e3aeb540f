//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod ai;
mod storage;
mod system;

pub use ai::*;
pub use storage::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MentorConfig {
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
