//! Chat session state for the mentor.
//!
//! - [`model`]: messages and sessions as persisted
//! - [`persistence`]: key-value backends and the session repository
//! - [`store`]: the owned session collection and active selection
//! - [`reconciler`]: merges a streamed reply into the trailing message

pub mod model;
pub mod persistence;
pub mod reconciler;
pub mod store;
pub mod title;

pub use model::{ChatSession, Message, DEFAULT_TITLE, GREETING_ID};
pub use persistence::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SessionRepository};
pub use reconciler::{StreamingReconciler, TurnOutcome, TurnState, STREAM_ERROR_TEXT};
pub use store::{ReplyHandle, ReplyTurn, SessionStore};
