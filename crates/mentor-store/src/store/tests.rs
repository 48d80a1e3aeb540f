//! Session store behavior: lifecycle, titling, sends, and persistence.

use chrono::{Duration, Utc};
use futures_util::StreamExt;
use mentor_ai::{AiError, Role, ScriptStep, ScriptedConversation, Turn};
use mentor_common::SessionId;

use super::*;
use crate::model::{ChatSession, Message, DEFAULT_TITLE, GREETING_ID};
use crate::persistence::{KeyValueStore, MemoryKeyValueStore, SessionRepository};
use crate::reconciler::{StreamingReconciler, TurnState, STREAM_ERROR_TEXT};

const KEY: &str = "air1_mentor_sessions";
const PERSONA: &str = "You are The Senior.";

struct Fixture {
    store: SessionStore,
    script: ScriptedConversation,
    backend: MemoryKeyValueStore,
}

impl Fixture {
    fn new() -> Self {
        Self::with_backend(MemoryKeyValueStore::new())
    }

    fn with_backend(backend: MemoryKeyValueStore) -> Self {
        let script = ScriptedConversation::new();
        let repo = SessionRepository::new(backend.clone(), KEY);
        let store = SessionStore::open(repo, Box::new(script.clone()), PERSONA);
        Self {
            store,
            script,
            backend,
        }
    }

    fn stored(&self) -> Vec<ChatSession> {
        SessionRepository::new(self.backend.clone(), KEY).load_all()
    }

    fn stored_session(&self, id: &SessionId) -> ChatSession {
        self.stored()
            .into_iter()
            .find(|s| &s.id == id)
            .expect("session should be persisted")
    }

    fn active(&self) -> SessionId {
        self.store.active_id().cloned().expect("an active session")
    }

    /// Backdate a session so recency ordering is deterministic.
    fn age(&mut self, id: &SessionId, minutes: i64) {
        let session = self.store.sessions.get_mut(id).unwrap();
        session.last_modified = Utc::now() - Duration::minutes(minutes);
    }

    async fn send(&mut self, text: &str) -> Option<crate::reconciler::TurnOutcome> {
        let (reconciler, stream) = StreamingReconciler::start(&mut self.store, text)?;
        Some(reconciler.run(&mut self.store, stream, |_, _| {}).await)
    }
}

fn assert_single_active(store: &SessionStore) {
    if store.is_empty() {
        assert!(store.active_id().is_none());
    } else {
        let active = store.active_id().expect("non-empty store must have an active session");
        assert!(store.session(active).is_some());
    }
}

// -- startup ----------------------------------------------------------------

#[test]
fn open_with_nothing_stored_creates_greeting_session() {
    let fx = Fixture::new();

    assert_eq!(fx.store.len(), 1);
    let session = fx.store.active_session().unwrap();
    assert_eq!(session.title, DEFAULT_TITLE);
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].id, GREETING_ID);
    assert_eq!(fx.script.initializations(), vec![Vec::<Turn>::new()]);
    assert_eq!(fx.script.last_persona().as_deref(), Some(PERSONA));
    assert_eq!(fx.stored().len(), 1);
}

#[test]
fn open_with_corrupt_storage_starts_fresh() {
    let mut backend = MemoryKeyValueStore::new();
    backend.set(KEY, "not json at all").unwrap();

    let fx = Fixture::with_backend(backend);

    assert_eq!(fx.store.len(), 1);
    assert_eq!(fx.store.transcript().len(), 1);
    // The fresh session replaced the corrupt value
    assert_eq!(fx.stored().len(), 1);
}

#[test]
fn open_restores_most_recent_session_without_greeting_context() {
    let mut older = ChatSession::new();
    older.last_modified = Utc::now() - Duration::hours(2);
    let mut newer = ChatSession::new();
    newer.messages.push(Message::user("UPSC, Hindi"));
    let mut reply = Message::user("Theek hai");
    reply.role = Role::Assistant;
    newer.messages.push(reply);
    newer.last_modified = Utc::now() - Duration::hours(1);

    let backend = MemoryKeyValueStore::new();
    SessionRepository::new(backend.clone(), KEY)
        .save_all([&older, &newer])
        .unwrap();

    let fx = Fixture::with_backend(backend);

    assert_eq!(fx.store.len(), 2);
    assert_eq!(fx.active(), newer.id);
    assert_eq!(
        fx.script.initializations(),
        vec![vec![Turn::user("UPSC, Hindi"), Turn::assistant("Theek hai")]]
    );
}

// -- create / select / delete ----------------------------------------------

#[test]
fn create_session_activates_persists_and_resets_context() {
    let mut fx = Fixture::new();
    let first = fx.active();

    let second = fx.store.create_session();

    assert_ne!(first, second);
    assert_eq!(fx.active(), second);
    assert_eq!(fx.store.len(), 2);
    assert_eq!(fx.stored().len(), 2);
    assert_eq!(fx.script.initializations().last().unwrap(), &Vec::<Turn>::new());
}

#[test]
fn select_unknown_session_is_a_no_op() {
    let mut fx = Fixture::new();
    let active = fx.active();
    let inits = fx.script.initializations().len();

    assert!(!fx.store.select_session(&SessionId::from("missing")));

    assert_eq!(fx.active(), active);
    assert_eq!(fx.script.initializations().len(), inits);
}

#[tokio::test]
async fn select_session_reinitializes_with_its_history() {
    let mut fx = Fixture::new();
    let first = fx.active();
    fx.script.push_fragments(&["Solve 50 MCQs today."]);
    fx.send("JEE, Hinglish").await.unwrap();

    fx.store.create_session();
    assert!(fx.store.select_session(&first));

    assert_eq!(fx.active(), first);
    assert_eq!(fx.store.transcript().len(), 3);
    assert_eq!(
        fx.script.initializations().last().unwrap(),
        &vec![
            Turn::user("JEE, Hinglish"),
            Turn::assistant("Solve 50 MCQs today.")
        ]
    );
}

#[test]
fn delete_inactive_session_keeps_selection() {
    let mut fx = Fixture::new();
    let first = fx.active();
    let second = fx.store.create_session();

    assert!(fx.store.delete_session(&first));

    assert_eq!(fx.active(), second);
    assert_eq!(fx.store.len(), 1);
    let stored = fx.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, second);
}

#[test]
fn delete_active_promotes_most_recently_modified() {
    let mut fx = Fixture::new();
    let a = fx.active();
    let b = fx.store.create_session();
    let c = fx.store.create_session();
    fx.age(&a, 5);
    fx.age(&b, 10);

    assert!(fx.store.delete_session(&c));

    assert_eq!(fx.active(), a);
    assert_eq!(fx.store.len(), 2);
    assert!(fx.stored().iter().all(|s| s.id != c));
    assert_eq!(fx.script.initializations().last().unwrap(), &Vec::<Turn>::new());
}

#[test]
fn delete_only_session_creates_a_new_one() {
    let mut fx = Fixture::new();
    let only = fx.active();

    assert!(fx.store.delete_session(&only));

    let replacement = fx.active();
    assert_ne!(replacement, only);
    assert_eq!(fx.store.len(), 1);
    assert_eq!(fx.store.transcript().len(), 1);
    assert_eq!(fx.store.transcript()[0].id, GREETING_ID);
    let stored = fx.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, replacement);
}

#[test]
fn delete_unknown_session_is_a_no_op() {
    let mut fx = Fixture::new();
    let before = fx.stored();
    assert!(!fx.store.delete_session(&SessionId::from("missing")));
    assert_eq!(fx.stored(), before);
    assert_eq!(fx.store.len(), 1);
}

#[test]
fn exactly_one_active_across_intent_sequences() {
    let mut fx = Fixture::new();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

    for _ in 0..300 {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let ids: Vec<SessionId> = fx
            .store
            .sessions_by_recency()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        let pick = ids[(seed >> 33) as usize % ids.len()].clone();

        match (seed >> 60) % 4 {
            0 => {
                fx.store.create_session();
            }
            1 => {
                fx.store.select_session(&pick);
                assert_eq!(fx.active(), pick);
            }
            2 => {
                fx.store.delete_session(&pick);
            }
            _ => {
                fx.store.delete_session(&SessionId::from("unknown"));
            }
        }

        assert_single_active(&fx.store);
        assert!(!fx.store.is_empty());
        assert_eq!(fx.stored().len(), fx.store.len());
    }
}

#[test]
fn sessions_by_recency_orders_newest_first() {
    let mut fx = Fixture::new();
    let a = fx.active();
    let b = fx.store.create_session();
    let c = fx.store.create_session();
    fx.age(&a, 1);
    fx.age(&b, 30);
    fx.age(&c, 10);

    let order: Vec<&SessionId> = fx.store.sessions_by_recency().iter().map(|s| &s.id).collect();
    assert_eq!(order, vec![&a, &c, &b]);
}

// -- sending and titles ----------------------------------------------------

#[test]
fn blank_messages_are_rejected() {
    let mut fx = Fixture::new();
    let id = fx.active();

    assert!(fx.store.append_user_message(&id, "").is_none());
    assert!(fx.store.append_user_message(&id, "   \n\t").is_none());
    assert!(fx.store.begin_reply("  ").is_none());

    assert_eq!(fx.store.transcript().len(), 1);
    assert_eq!(fx.store.active_session().unwrap().title, DEFAULT_TITLE);
    assert!(fx.script.sent().is_empty());
}

#[test]
fn append_to_unknown_session_is_rejected() {
    let mut fx = Fixture::new();
    assert!(fx
        .store
        .append_user_message(&SessionId::from("missing"), "hello")
        .is_none());
}

#[test]
fn short_first_message_becomes_title_verbatim() {
    let mut fx = Fixture::new();
    let id = fx.active();

    fx.store.append_user_message(&id, "  Explain Newton's third law ").unwrap();

    let session = fx.store.session(&id).unwrap();
    assert_eq!(session.title, "Explain Newton's third law");
    assert_eq!(session.messages[1].text, "Explain Newton's third law");
    assert_eq!(fx.stored_session(&id).title, "Explain Newton's third law");
}

#[test]
fn long_first_message_is_truncated_with_marker() {
    let mut fx = Fixture::new();
    let id = fx.active();

    fx.store
        .append_user_message(&id, "I keep failing mock tests in organic chemistry")
        .unwrap();

    assert_eq!(
        fx.store.session(&id).unwrap().title,
        "I keep failing mock tests in o..."
    );
}

#[test]
fn later_messages_never_change_title() {
    let mut fx = Fixture::new();
    let id = fx.active();

    fx.store.append_user_message(&id, "NEET").unwrap();
    fx.store.append_user_message(&id, "Actually JEE Advanced please").unwrap();

    assert_eq!(fx.store.session(&id).unwrap().title, "NEET");
}

#[test]
fn title_stays_locked_even_if_it_equals_the_default() {
    let mut fx = Fixture::new();
    let id = fx.active();

    fx.store.append_user_message(&id, DEFAULT_TITLE).unwrap();
    fx.store.append_user_message(&id, "Something else").unwrap();

    assert_eq!(fx.store.session(&id).unwrap().title, DEFAULT_TITLE);
}

#[test]
fn append_bumps_last_modified() {
    let mut fx = Fixture::new();
    let id = fx.active();
    fx.age(&id, 60);
    let before = fx.store.session(&id).unwrap().last_modified;

    fx.store.append_user_message(&id, "hi").unwrap();

    assert!(fx.store.session(&id).unwrap().last_modified > before);
}

// -- streaming replies -----------------------------------------------------

#[tokio::test]
async fn newton_scenario_persists_three_messages() {
    let mut fx = Fixture::new();
    let id = fx.active();
    assert_eq!(fx.store.transcript().len(), 1);
    fx.script
        .push_fragments(&["Newton's", " third law states..."]);

    let outcome = fx.send("Explain Newton's third law").await.unwrap();

    assert_eq!(outcome.state, TurnState::Finalized);
    let session = fx.store.session(&id).unwrap();
    assert_eq!(session.title, "Explain Newton's third law");
    assert_eq!(session.messages.len(), 3);
    assert_eq!(session.messages[2].text, "Newton's third law states...");
    assert_eq!(session.messages[2].role, Role::Assistant);
    assert!(!session.messages[2].pending);

    let stored = fx.stored_session(&id);
    assert_eq!(stored.messages.len(), 3);
    assert_eq!(stored.messages[2].text, "Newton's third law states...");
    assert_eq!(fx.script.sent(), vec!["Explain Newton's third law"]);
}

#[tokio::test]
async fn mid_stream_failure_persists_error_text() {
    let mut fx = Fixture::new();
    let id = fx.active();
    fx.script.push_reply([
        ScriptStep::Fragment("Newton's".into()),
        ScriptStep::Fail(AiError::NetworkError("connection reset".into())),
    ]);

    let outcome = fx.send("Explain Newton's third law").await.unwrap();

    assert_eq!(outcome.state, TurnState::Failed);
    let last = fx.store.session(&id).unwrap().messages.last().unwrap().clone();
    assert_eq!(last.text, STREAM_ERROR_TEXT);
    assert!(!last.pending);
    let stored = fx.stored_session(&id);
    assert_eq!(stored.messages.len(), 3);
    assert_eq!(stored.messages[2].text, STREAM_ERROR_TEXT);
}

#[tokio::test]
async fn session_recovers_after_failure() {
    let mut fx = Fixture::new();
    fx.script
        .push_reply([ScriptStep::Fail(AiError::RateLimited)]);
    fx.script.push_fragments(&["Back online."]);

    assert_eq!(fx.send("one").await.unwrap().state, TurnState::Failed);
    let outcome = fx.send("two").await.unwrap();

    assert_eq!(outcome.state, TurnState::Finalized);
    assert_eq!(outcome.text, "Back online.");
    assert_eq!(fx.store.transcript().len(), 5);
}

#[test]
fn second_send_while_streaming_is_rejected() {
    let mut fx = Fixture::new();
    let id = fx.active();

    let turn = fx.store.begin_reply("first").unwrap();
    let len = fx.store.transcript().len();

    assert!(fx.store.begin_reply("second").is_none());
    assert!(fx.store.append_user_message(&id, "third").is_none());

    assert_eq!(fx.store.transcript().len(), len);
    assert_eq!(fx.script.sent(), vec!["first"]);
    drop(turn);
}

#[test]
fn placeholder_is_visible_but_never_persisted() {
    let mut fx = Fixture::new();
    let id = fx.active();

    let turn = fx.store.begin_reply("hello").unwrap();
    fx.store.apply_fragment(&turn.handle, "partial");

    let last = fx.store.transcript().last().unwrap();
    assert!(last.pending);
    assert_eq!(last.text, "partial");
    assert_eq!(last.role, Role::Assistant);

    let stored = fx.stored_session(&id);
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[1].role, Role::User);
}

#[tokio::test]
async fn reply_lands_in_origin_session_after_switching() {
    let mut fx = Fixture::new();
    let origin = fx.active();
    fx.script.push_fragments(&["Answer"]);

    let (mut reconciler, mut stream) = StreamingReconciler::start(&mut fx.store, "question").unwrap();
    let other = fx.store.create_session();
    while let Some(item) = stream.next().await {
        reconciler.on_fragment(&mut fx.store, &item.unwrap());
    }
    reconciler.on_complete(&mut fx.store);

    assert_eq!(fx.active(), other);
    assert_eq!(fx.store.session(&other).unwrap().messages.len(), 1);
    let origin_session = fx.store.session(&origin).unwrap();
    assert_eq!(origin_session.messages.last().unwrap().text, "Answer");
    assert_eq!(fx.stored_session(&origin).messages.len(), 3);
}

#[tokio::test]
async fn fragments_for_deleted_session_are_dropped() {
    let mut fx = Fixture::new();
    let origin = fx.active();
    fx.store.create_session();
    fx.store.select_session(&origin);
    fx.script.push_fragments(&["late"]);

    let (mut reconciler, mut stream) = StreamingReconciler::start(&mut fx.store, "q").unwrap();
    fx.store.delete_session(&origin);

    let fragment = stream.next().await.unwrap().unwrap();
    assert!(reconciler.on_fragment(&mut fx.store, &fragment).is_none());
    reconciler.on_complete(&mut fx.store);

    assert!(fx.store.session(&origin).is_none());
    assert!(fx.stored().iter().all(|s| s.id != origin));
}

#[tokio::test]
async fn initialize_failure_is_not_fatal() {
    let script = ScriptedConversation::new();
    script.set_fail_initialize(true);
    script.push_fragments(&["still here"]);
    let repo = SessionRepository::new(MemoryKeyValueStore::new(), KEY);
    let mut store = SessionStore::open(repo, Box::new(script.clone()), PERSONA);

    let (reconciler, stream) = StreamingReconciler::start(&mut store, "hi").unwrap();
    let outcome = reconciler.run(&mut store, stream, |_, _| {}).await;

    assert_eq!(outcome.state, TurnState::Finalized);
    assert_eq!(outcome.text, "still here");
}

#[tokio::test]
async fn reopening_restores_identical_sessions() {
    let backend = MemoryKeyValueStore::new();
    let mut fx = Fixture::with_backend(backend.clone());
    fx.script.push_fragments(&["Daily plan: ", "2 mocks."]);
    fx.send("Make me a plan").await.unwrap();
    fx.store.create_session();

    let expected: Vec<ChatSession> = fx.store.sessions_by_recency().into_iter().cloned().collect();
    let reopened = Fixture::with_backend(backend);
    let actual: Vec<ChatSession> = reopened
        .store
        .sessions_by_recency()
        .into_iter()
        .cloned()
        .collect();

    assert_eq!(actual, expected);
}
