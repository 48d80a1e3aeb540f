//! Handles for an in-flight assistant reply.

use mentor_ai::FragmentStream;
use mentor_common::SessionId;

/// Identifies the placeholder message a reply streams into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHandle {
    pub session_id: SessionId,
    pub message_id: String,
}

/// A started reply: where it goes and the fragments that will fill it.
pub struct ReplyTurn {
    pub handle: ReplyHandle,
    pub stream: FragmentStream,
}

impl std::fmt::Debug for ReplyTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyTurn")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
