//! Message mutations: user sends and the reply lifecycle.

use mentor_common::SessionId;
use tracing::debug;

use crate::model::Message;
use crate::reconciler::STREAM_ERROR_TEXT;
use crate::title::derive_title;

use super::manager::SessionStore;
use super::types::{ReplyHandle, ReplyTurn};

impl SessionStore {
    /// Append a user message to `session_id` and persist.
    ///
    /// Rejected (returns `None`, no state change) when the text is blank,
    /// the session is unknown, or a reply is still streaming into it. The
    /// first user message of a session sets its title. Returns the new
    /// message id.
    pub fn append_user_message(&mut self, session_id: &SessionId, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring empty message");
            return None;
        }
        if self.is_streaming(session_id) {
            debug!(session = %session_id, "ignoring send while a reply is streaming");
            return None;
        }
        let Some(session) = self.sessions.get_mut(session_id) else {
            debug!(session = %session_id, "ignoring send to unknown session");
            return None;
        };

        let first_user_message = !session.has_user_message();
        let message = Message::user(text);
        let id = message.id.clone();
        session.messages.push(message);
        if first_user_message {
            session.title = derive_title(text);
        }
        session.touch();

        self.persist();
        Some(id)
    }

    /// Send `text` from the active session and start streaming the reply.
    ///
    /// Appends the user message, then an empty pending assistant
    /// placeholder (never persisted), and asks the capability for the
    /// reply. Returns `None` under the same conditions as
    /// [`append_user_message`](Self::append_user_message), or when there is
    /// no active session.
    pub fn begin_reply(&mut self, text: &str) -> Option<ReplyTurn> {
        let session_id = self.active.clone()?;
        self.append_user_message(&session_id, text)?;

        let placeholder = Message::placeholder();
        let handle = ReplyHandle {
            session_id: session_id.clone(),
            message_id: placeholder.id.clone(),
        };
        self.sessions.get_mut(&session_id)?.messages.push(placeholder);
        self.in_flight
            .insert(session_id.clone(), handle.message_id.clone());

        let stream = self.capability.stream_reply(text.trim());
        debug!(session = %session_id, "reply streaming");
        Some(ReplyTurn { handle, stream })
    }

    pub fn is_streaming(&self, session_id: &SessionId) -> bool {
        self.in_flight.contains_key(session_id)
    }

    /// Append a fragment to the placeholder named by `handle`.
    ///
    /// Returns the accumulated text, or `None` if the reply is no longer in
    /// flight (for example its session was deleted).
    pub fn apply_fragment(&mut self, handle: &ReplyHandle, fragment: &str) -> Option<&str> {
        if !self.owns_reply(handle) {
            return None;
        }
        let message = self
            .sessions
            .get_mut(&handle.session_id)?
            .message_mut(&handle.message_id)?;
        message.text.push_str(fragment);
        Some(message.text.as_str())
    }

    /// Settle the placeholder with the text accumulated so far and persist.
    pub fn finalize_reply(&mut self, handle: &ReplyHandle) -> bool {
        self.settle(handle, None)
    }

    /// Replace the placeholder's text with the fixed error message and
    /// persist. The error stays in the transcript as a regular turn.
    pub fn fail_reply(&mut self, handle: &ReplyHandle) -> bool {
        self.settle(handle, Some(STREAM_ERROR_TEXT))
    }

    fn settle(&mut self, handle: &ReplyHandle, replacement: Option<&str>) -> bool {
        if !self.owns_reply(handle) {
            return false;
        }
        self.in_flight.remove(&handle.session_id);

        let Some(session) = self.sessions.get_mut(&handle.session_id) else {
            return false;
        };
        let Some(message) = session.message_mut(&handle.message_id) else {
            return false;
        };
        if let Some(text) = replacement {
            message.text = text.to_string();
        }
        message.pending = false;
        session.touch();

        self.persist();
        true
    }

    fn owns_reply(&self, handle: &ReplyHandle) -> bool {
        self.in_flight.get(&handle.session_id) == Some(&handle.message_id)
    }
}
