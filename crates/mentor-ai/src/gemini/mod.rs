//! Google Gemini API client.
//!
//! Implements [`ConversationCapability`](crate::ConversationCapability) for
//! Gemini models via the Generative Language streaming API.

mod client;
mod config;
mod conversation;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use conversation::GeminiConversation;
