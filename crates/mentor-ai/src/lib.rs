//! AI conversation capability for the mentor.
//!
//! Provides:
//! - The [`ConversationCapability`] contract: initialize with a persona and
//!   prior turns, then stream replies as lazy fragment sequences
//! - A Gemini implementation over SSE streaming
//! - The persona script and canned greeting
//! - A scripted in-process capability for driving the session layer in tests

pub mod capability;
pub mod gemini;
pub mod persona;
pub mod scripted;
pub mod streaming;

pub use capability::{ConversationCapability, FragmentStream};
pub use gemini::{GeminiClient, GeminiConfig, GeminiConversation};
pub use scripted::{ScriptStep, ScriptedConversation};

pub use mentor_common::AiError;

/// Who authored a turn.
///
/// `model` is accepted on read because that is what the Gemini API (and
/// older stored sessions) call the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

/// One exchange entry handed to the capability as context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}
