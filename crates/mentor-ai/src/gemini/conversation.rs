//! [`ConversationCapability`] implementation backed by [`GeminiClient`].

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::capability::{ConversationCapability, FragmentStream};
use crate::{AiError, Turn};

use super::client::GeminiClient;

type Memory = Arc<Mutex<Vec<Turn>>>;

/// A Gemini chat that remembers its own turns between replies.
///
/// Each `initialize` swaps in a fresh memory. Reply tasks still running
/// from an earlier activation keep writing to the memory they started
/// with, so they can never leak turns into the new conversation.
pub struct GeminiConversation {
    client: Arc<GeminiClient>,
    persona: Option<String>,
    memory: Option<Memory>,
}

impl GeminiConversation {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Arc::new(client),
            persona: None,
            memory: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.memory.is_some()
    }

    /// Snapshot of the turns the model currently has as context.
    pub fn history(&self) -> Vec<Turn> {
        self.memory
            .as_ref()
            .map(|m| lock(m).clone())
            .unwrap_or_default()
    }
}

fn lock(memory: &Memory) -> MutexGuard<'_, Vec<Turn>> {
    memory.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConversationCapability for GeminiConversation {
    fn initialize(
        &mut self,
        persona_instruction: &str,
        prior_turns: &[Turn],
    ) -> Result<(), AiError> {
        self.persona = Some(persona_instruction.to_string());
        self.memory = None;

        if !self.client.config().has_api_key() {
            let err = AiError::NotConfigured("Gemini API key is empty".into());
            error!("Failed to initialize chat session: {err}");
            return Err(err);
        }

        debug!(turns = prior_turns.len(), "Gemini conversation initialized");
        self.memory = Some(Arc::new(Mutex::new(prior_turns.to_vec())));
        Ok(())
    }

    fn stream_reply(&mut self, user_text: &str) -> FragmentStream {
        if self.memory.is_none() {
            let persona = self.persona.clone().unwrap_or_default();
            if let Err(e) = self.initialize(&persona, &[]) {
                warn!("Lazy conversation initialization failed: {e}");
            }
        }

        let Some(memory) = self.memory.clone() else {
            return stream::once(async { Err::<String, AiError>(AiError::NotInitialized) }).boxed();
        };

        let history = lock(&memory).clone();
        let body = self
            .client
            .build_request_body(self.persona.as_deref(), &history, user_text);

        let (tx, rx) = mpsc::unbounded_channel::<Result<String, AiError>>();
        let client = Arc::clone(&self.client);
        let user_turn = Turn::user(user_text);

        tokio::spawn(async move {
            let fragment_tx = tx.clone();
            let result = client
                .stream_generate(body, move |fragment| {
                    // Receiver gone means the caller stopped listening
                    let _ = fragment_tx.send(Ok(fragment));
                })
                .await;

            match result {
                Ok(full_reply) => {
                    // An empty reply (e.g. safety-blocked) keeps only the
                    // user turn, the same history `prior_turns` rebuilds.
                    let mut turns = lock(&memory);
                    turns.push(user_turn);
                    if full_reply.is_empty() {
                        debug!("empty reply left out of conversation memory");
                    } else {
                        turns.push(Turn::assistant(full_reply));
                    }
                }
                Err(e) => {
                    warn!("Gemini stream failed: {e}");
                    let _ = tx.send(Err(e));
                }
            }
        });

        stream::unfold(rx, |mut rx| async move {
            let item = rx.recv().await?;
            Some((item, rx))
        })
        .boxed()
    }
}
