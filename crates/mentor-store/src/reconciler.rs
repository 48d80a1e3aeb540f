//! Streaming reconciler: folds a reply's fragment stream into the
//! placeholder message it belongs to.
//!
//! Per reply the state moves `Idle -> Streaming -> {Finalized, Failed}`.
//! There is no cancellation path; a stream that never ends keeps its
//! session `Streaming` and blocks further sends to it.

use futures_util::StreamExt;
use mentor_ai::{AiError, FragmentStream};
use mentor_common::SessionId;
use tracing::{debug, warn};

use crate::store::{ReplyHandle, ReplyTurn, SessionStore};

/// Shown in place of a reply whose stream failed.
pub const STREAM_ERROR_TEXT: &str = "**System Error:** Connection lost. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Streaming,
    Finalized,
    Failed,
}

/// How a reply ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub state: TurnState,
    /// Final message text: the full concatenation, or the error text.
    pub text: String,
    pub fragments: usize,
}

/// Drives one reply from start to a terminal state.
#[derive(Debug)]
pub struct StreamingReconciler {
    handle: ReplyHandle,
    state: TurnState,
    fragments: usize,
    text: String,
}

impl StreamingReconciler {
    /// Send `text` from the active session. Returns the reconciler, now
    /// `Streaming`, and the fragments to feed it; `None` if the store
    /// rejected the send.
    pub fn start(store: &mut SessionStore, text: &str) -> Option<(Self, FragmentStream)> {
        let ReplyTurn { handle, stream } = store.begin_reply(text)?;
        Some((Self::new(handle), stream))
    }

    pub fn new(handle: ReplyHandle) -> Self {
        Self {
            handle,
            state: TurnState::Streaming,
            fragments: 0,
            text: String::new(),
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn session_id(&self) -> &SessionId {
        &self.handle.session_id
    }

    /// Append one fragment. Returns the accumulated text when the store
    /// accepted it.
    pub fn on_fragment(&mut self, store: &mut SessionStore, fragment: &str) -> Option<&str> {
        if self.state != TurnState::Streaming {
            return None;
        }
        let accumulated = store.apply_fragment(&self.handle, fragment)?;
        self.fragments += 1;
        self.text.clear();
        self.text.push_str(accumulated);
        Some(&self.text)
    }

    /// The stream ended cleanly.
    pub fn on_complete(&mut self, store: &mut SessionStore) -> TurnState {
        if self.state == TurnState::Streaming {
            store.finalize_reply(&self.handle);
            self.state = TurnState::Finalized;
            debug!(session = %self.handle.session_id, fragments = self.fragments, "reply finalized");
        }
        self.state
    }

    /// The stream raised an error; the partial text is discarded.
    pub fn on_error(&mut self, store: &mut SessionStore, error: &AiError) -> TurnState {
        if self.state == TurnState::Streaming {
            warn!(session = %self.handle.session_id, "Reply stream failed: {error}");
            store.fail_reply(&self.handle);
            self.text = STREAM_ERROR_TEXT.to_string();
            self.state = TurnState::Failed;
        }
        self.state
    }

    /// Consume `stream` to the end, calling `on_update` with the session id
    /// and accumulated text after every accepted fragment.
    pub async fn run(
        mut self,
        store: &mut SessionStore,
        mut stream: FragmentStream,
        mut on_update: impl FnMut(&SessionId, &str),
    ) -> TurnOutcome {
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    if self.on_fragment(store, &fragment).is_some() {
                        on_update(&self.handle.session_id, &self.text);
                    }
                }
                Err(e) => {
                    self.on_error(store, &e);
                    return self.into_outcome();
                }
            }
        }
        self.on_complete(store);
        self.into_outcome()
    }

    fn into_outcome(self) -> TurnOutcome {
        TurnOutcome {
            state: self.state,
            text: self.text,
            fragments: self.fragments,
        }
    }
}

impl SessionStore {
    /// Reply state of `session_id`: `Streaming` while a reply is in
    /// flight, `Idle` otherwise.
    pub fn reply_state(&self, session_id: &SessionId) -> TurnState {
        if self.is_streaming(session_id) {
            TurnState::Streaming
        } else {
            TurnState::Idle
        }
    }
}
