//! Messages and sessions.

use chrono::{DateTime, Utc};
use mentor_ai::{persona, Role, Turn};
use mentor_common::{new_id, SessionId};
use serde::{Deserialize, Serialize};

/// Title of a session that has not seen a user message yet.
pub const DEFAULT_TITLE: &str = "New Strategy Session";

/// Id of the canned greeting that opens every session.
pub const GREETING_ID: &str = "intro";

/// A single transcript entry.
///
/// `pending` is true while the text is still being streamed. It is never
/// written to storage; pending messages themselves are dropped on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub pending: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            text: text.into(),
            created_at: Utc::now(),
            pending: false,
        }
    }

    pub(crate) fn greeting() -> Self {
        Self {
            id: GREETING_ID.to_string(),
            role: Role::Assistant,
            text: persona::GREETING.to_string(),
            created_at: Utc::now(),
            pending: false,
        }
    }

    pub(crate) fn placeholder() -> Self {
        Self {
            id: new_id(),
            role: Role::Assistant,
            text: String::new(),
            created_at: Utc::now(),
            pending: true,
        }
    }

    pub fn is_greeting(&self) -> bool {
        self.id == GREETING_ID
    }
}

/// A titled, timestamped transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    #[serde(deserialize_with = "instant::deserialize")]
    pub last_modified: DateTime<Utc>,
}

impl ChatSession {
    /// Fresh session seeded with the canned greeting.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![Message::greeting()],
            last_modified: Utc::now(),
        }
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// Context for the conversation capability: every finished exchange
    /// entry except the greeting. Empty texts are skipped because the
    /// provider rejects empty parts.
    pub fn prior_turns(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .filter(|m| !m.is_greeting() && !m.pending && !m.text.is_empty())
            .map(|m| Turn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect()
    }

    pub(crate) fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Copy with in-flight placeholders removed, as written to storage.
    pub(crate) fn without_pending(&self) -> Self {
        let mut copy = self.clone();
        copy.messages.retain(|m| !m.pending);
        copy
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// `lastModified` is written as RFC 3339, but sessions saved by the web
/// client carry epoch milliseconds; both are accepted.
mod instant {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(DateTime<Utc>),
        Millis(i64),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Text(t) => Ok(t),
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| D::Error::custom(format!("timestamp {ms} out of range"))),
        }
    }
}
