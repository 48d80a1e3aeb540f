//! The session store: owned collection, active selection, and the
//! mutations the shell's intents map onto.

mod chat;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::SessionStore;
pub use types::{ReplyHandle, ReplyTurn};
