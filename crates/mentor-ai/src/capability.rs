//! The conversation contract the session layer talks to.

use futures_util::stream::BoxStream;

use crate::{AiError, Turn};

/// Lazy sequence of reply fragments for one user turn.
///
/// Fragments arrive in order and never overlap. A failure ends the sequence
/// with an `Err` item; nothing follows it.
pub type FragmentStream = BoxStream<'static, Result<String, AiError>>;

/// A stateful conversation with a persona-scripted model.
///
/// The capability remembers every completed exchange since the last
/// [`initialize`](Self::initialize), so callers must initialize once per
/// session activation and before any [`stream_reply`](Self::stream_reply).
pub trait ConversationCapability: Send {
    /// Reset the conversation to `prior_turns` under `persona_instruction`.
    ///
    /// On failure the capability is left without context; a later
    /// `stream_reply` retries with empty history.
    fn initialize(&mut self, persona_instruction: &str, prior_turns: &[Turn])
        -> Result<(), AiError>;

    /// Send one user turn and stream back the reply.
    fn stream_reply(&mut self, user_text: &str) -> FragmentStream;
}
