//! Whole-collection load/save of sessions under one namespaced key.

use mentor_common::StoreError;
use tracing::{debug, warn};

use crate::model::ChatSession;

use super::KeyValueStore;

pub struct SessionRepository {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl SessionRepository {
    pub fn new(backend: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load every stored session.
    ///
    /// Never fails: unreadable or malformed data is logged and treated as
    /// an empty collection.
    pub fn load_all(&self) -> Vec<ChatSession> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no stored sessions");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, "Failed to read stored sessions: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ChatSession>>(&raw) {
            Ok(sessions) => {
                debug!(key = %self.key, count = sessions.len(), "loaded sessions");
                sessions
            }
            Err(e) => {
                warn!(key = %self.key, "Failed to parse stored sessions, discarding: {e}");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored collection. In-flight placeholders are left
    /// out.
    pub fn save_all<'a>(
        &mut self,
        sessions: impl IntoIterator<Item = &'a ChatSession>,
    ) -> Result<(), StoreError> {
        let stored: Vec<ChatSession> = sessions
            .into_iter()
            .map(ChatSession::without_pending)
            .collect();
        let json = serde_json::to_string(&stored)?;
        self.backend.set(&self.key, &json)?;
        debug!(key = %self.key, count = stored.len(), "saved sessions");
        Ok(())
    }
}
