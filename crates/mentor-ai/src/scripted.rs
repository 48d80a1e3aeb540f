//! In-process conversation that replays scripted replies.
//!
//! Used to drive the session layer deterministically without a network.
//! Clones share state, so a test can keep a handle after handing the
//! capability to a session store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, StreamExt};

use crate::capability::{ConversationCapability, FragmentStream};
use crate::{AiError, Turn};

/// One item of a scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Fragment(String),
    Fail(AiError),
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<Vec<ScriptStep>>,
    initializations: Vec<Vec<Turn>>,
    persona: Option<String>,
    sent: Vec<String>,
    fail_initialize: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedConversation {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue the steps for the next `stream_reply`.
    pub fn push_reply(&self, steps: impl IntoIterator<Item = ScriptStep>) {
        self.state().replies.push_back(steps.into_iter().collect());
    }

    /// Queue a successful reply made of `fragments`.
    pub fn push_fragments(&self, fragments: &[&str]) {
        self.push_reply(
            fragments
                .iter()
                .map(|f| ScriptStep::Fragment((*f).to_string())),
        );
    }

    /// Make every following `initialize` fail until reset.
    pub fn set_fail_initialize(&self, fail: bool) {
        self.state().fail_initialize = fail;
    }

    /// Prior turns passed to each `initialize`, oldest first.
    pub fn initializations(&self) -> Vec<Vec<Turn>> {
        self.state().initializations.clone()
    }

    pub fn last_persona(&self) -> Option<String> {
        self.state().persona.clone()
    }

    /// User texts passed to `stream_reply`, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }
}

impl ConversationCapability for ScriptedConversation {
    fn initialize(
        &mut self,
        persona_instruction: &str,
        prior_turns: &[Turn],
    ) -> Result<(), AiError> {
        let mut state = self.state();
        if state.fail_initialize {
            return Err(AiError::NotConfigured("scripted failure".into()));
        }
        state.persona = Some(persona_instruction.to_string());
        state.initializations.push(prior_turns.to_vec());
        Ok(())
    }

    fn stream_reply(&mut self, user_text: &str) -> FragmentStream {
        let steps = {
            let mut state = self.state();
            state.sent.push(user_text.to_string());
            state.replies.pop_front().unwrap_or_default()
        };

        let mut items = Vec::with_capacity(steps.len());
        for step in steps {
            match step {
                ScriptStep::Fragment(text) => items.push(Ok(text)),
                ScriptStep::Fail(e) => {
                    items.push(Err(e));
                    break;
                }
            }
        }
        stream::iter(items).boxed()
    }
}
