//! Plain-text rendering of the session list and transcripts.

use chrono::Local;
use mentor_ai::Role;
use mentor_store::{Message, SessionStore};

/// Trailing characters of a session id shown in listings.
pub const SHORT_ID_LEN: usize = 6;

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Senior",
    }
}

/// Sessions most recent first, numbered from 1. The active one is starred.
pub fn session_list(store: &SessionStore) -> String {
    let active = store.active_id();
    store
        .sessions_by_recency()
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let marker = if Some(&session.id) == active { '*' } else { ' ' };
            let mut line = format!(
                "{marker} {:>2}. {}  [{}] {}",
                i + 1,
                session.title,
                session.id.short(SHORT_ID_LEN),
                session.last_modified.with_timezone(&Local).format("%b %d %H:%M"),
            );
            if store.is_streaming(&session.id) {
                line.push_str("  (replying)");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn message(message: &Message) -> String {
    format!("{}: {}", speaker(message.role), message.text)
}

pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(message)
        .collect::<Vec<_>>()
        .join("\n\n")
}
