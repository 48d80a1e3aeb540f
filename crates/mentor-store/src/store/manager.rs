//! SessionStore struct, lifecycle operations, and read access.

use std::collections::HashMap;

use mentor_ai::{ConversationCapability, Turn};
use mentor_common::SessionId;
use tracing::{debug, error, info};

use crate::model::{ChatSession, Message};
use crate::persistence::SessionRepository;

/// Owns every chat session, the active selection, and the conversation
/// capability bound to the active session.
///
/// Invariant: whenever `sessions` is non-empty, `active` names one of
/// them. It is `None` only between deleting the last session and creating
/// its replacement, inside [`delete_session`](Self::delete_session).
pub struct SessionStore {
    pub(super) sessions: HashMap<SessionId, ChatSession>,
    pub(super) active: Option<SessionId>,
    /// Placeholder message id per session with a reply streaming.
    pub(super) in_flight: HashMap<SessionId, String>,
    pub(super) repository: SessionRepository,
    pub(super) capability: Box<dyn ConversationCapability>,
    pub(super) persona: String,
}

impl SessionStore {
    /// Load stored sessions and activate the most recently modified one,
    /// or start a fresh session when nothing usable is stored.
    pub fn open(
        repository: SessionRepository,
        capability: Box<dyn ConversationCapability>,
        persona: impl Into<String>,
    ) -> Self {
        let sessions: HashMap<SessionId, ChatSession> = repository
            .load_all()
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut store = Self {
            sessions,
            active: None,
            in_flight: HashMap::new(),
            repository,
            capability,
            persona: persona.into(),
        };

        match store.most_recent_id() {
            Some(id) => {
                info!(count = store.sessions.len(), "restoring most recent session");
                store.select_session(&id);
            }
            None => {
                store.create_session();
            }
        }
        store
    }

    /// Start a new session with the canned greeting and make it active.
    ///
    /// The capability is reset with empty history: the greeting is never
    /// part of the model's context. Shells should clear any half-typed
    /// input when calling this.
    pub fn create_session(&mut self) -> SessionId {
        let session = ChatSession::new();
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        self.active = Some(id.clone());
        self.persist();
        self.initialize_capability(&[]);
        info!(session = %id, "created session");
        id
    }

    /// Make `id` active and reload the capability with its history.
    ///
    /// Unknown ids are ignored. Returns whether the selection happened.
    pub fn select_session(&mut self, id: &SessionId) -> bool {
        let Some(session) = self.sessions.get(id) else {
            debug!(session = %id, "ignoring selection of unknown session");
            return false;
        };
        let turns = session.prior_turns();
        self.active = Some(id.clone());
        self.initialize_capability(&turns);
        debug!(session = %id, turns = turns.len(), "selected session");
        true
    }

    /// Remove `id` and persist right away.
    ///
    /// Deleting the active session promotes the most recently modified
    /// survivor, or creates a new session when none remain. Unknown ids
    /// are ignored. Returns whether anything was deleted.
    pub fn delete_session(&mut self, id: &SessionId) -> bool {
        if self.sessions.remove(id).is_none() {
            debug!(session = %id, "ignoring deletion of unknown session");
            return false;
        }
        if self.in_flight.remove(id).is_some() {
            debug!(session = %id, "dropped in-flight reply of deleted session");
        }
        info!(session = %id, "deleted session");

        if self.active.as_ref() != Some(id) {
            self.persist();
            return true;
        }

        self.active = None;
        match self.most_recent_id() {
            Some(next) => {
                self.select_session(&next);
                self.persist();
            }
            // Saving happens inside create_session, with the new session
            // already in place, so the stored collection is never empty.
            None => {
                self.create_session();
            }
        }
        true
    }

    pub(super) fn initialize_capability(&mut self, turns: &[Turn]) {
        if let Err(e) = self.capability.initialize(&self.persona, turns) {
            error!("Failed to initialize conversation: {e}");
        }
    }

    /// Write the whole collection. Skipped when empty so a transient empty
    /// state can never erase stored history. Failures are logged only.
    pub(super) fn persist(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        let ordered = sorted_by_recency(self.sessions.values());
        if let Err(e) = self.repository.save_all(ordered) {
            error!("Failed to persist sessions: {e}");
        }
    }

    fn most_recent_id(&self) -> Option<SessionId> {
        sorted_by_recency(self.sessions.values())
            .first()
            .map(|s| s.id.clone())
    }

    /// Sessions ordered most recently modified first.
    pub fn sessions_by_recency(&self) -> Vec<&ChatSession> {
        sorted_by_recency(self.sessions.values())
    }

    pub fn session(&self, id: &SessionId) -> Option<&ChatSession> {
        self.sessions.get(id)
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    /// Visible transcript of the active session, placeholder included.
    pub fn transcript(&self) -> &[Message] {
        self.active_session()
            .map(|s| s.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Most recently modified first; ties broken by id for a stable order.
fn sorted_by_recency<'a>(sessions: impl Iterator<Item = &'a ChatSession>) -> Vec<&'a ChatSession> {
    let mut sorted: Vec<&ChatSession> = sessions.collect();
    sorted.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}
