//! Query orchestrator: composes the model request, runs it, and records the
//! exchange in the conversation context.
//!
//! Model failures never escape from here. They become an apology text that
//! flows through the rest of the pipeline like any other answer.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::context::{ContextStore, Turn};
use crate::error::ChatError;
use crate::prompt::{ModelRequest, SYSTEM_CONTRACT};
use crate::provider::ModelProvider;
use crate::tags;

/// Turns from the end of the history included in each prompt.
pub const DEFAULT_PROMPT_HISTORY_TURNS: usize = 4;

/// Text returned in place of a model answer when the model call fails.
pub fn apology(err: &ChatError) -> String {
    format!("Sorry, I encountered an error: {}", err)
}

/// Runs one model exchange per user query against a shared context.
pub struct QueryOrchestrator {
    provider: Arc<dyn ModelProvider>,
    context: ContextStore,
    prompt_history_turns: usize,
    record_failed_exchanges: bool,
}

impl QueryOrchestrator {
    pub fn new(provider: Arc<dyn ModelProvider>, context: ContextStore) -> Self {
        Self {
            provider,
            context,
            prompt_history_turns: DEFAULT_PROMPT_HISTORY_TURNS,
            record_failed_exchanges: true,
        }
    }

    /// Number of trailing turns rendered into each prompt.
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.prompt_history_turns = turns;
        self
    }

    /// Whether an exchange whose model call failed is still recorded.
    pub fn with_failed_exchanges(mut self, record: bool) -> Self {
        self.record_failed_exchanges = record;
        self
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// Get the model's raw answer (tags intact) for `user_input`.
    ///
    /// `history` overrides the stored context for this call only; with
    /// `None` the last turns of the store are used. Either way the exchange
    /// is appended to the store afterwards. Only a context failure is
    /// returned as an error.
    pub async fn respond(
        &self,
        user_input: &str,
        history: Option<&[Turn]>,
    ) -> Result<String, ChatError> {
        let stored;
        let history = match history {
            Some(turns) => turns,
            None => {
                stored = self.context.recent(self.prompt_history_turns)?;
                &stored
            }
        };

        let request = ModelRequest::compose(
            SYSTEM_CONTRACT,
            history,
            self.prompt_history_turns,
            user_input,
        );

        let started = Instant::now();
        let (text, succeeded) = match self.provider.complete(&request).await {
            Ok(text) => {
                debug!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    history_turns = request.history().len(),
                    response_chars = text.len(),
                    tagged = tags::contains_tags(&text),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Model answered"
                );
                (text, true)
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Model call failed"
                );
                (apology(&e), false)
            }
        };

        if succeeded || self.record_failed_exchanges {
            self.context.append_exchange(user_input, text.as_str())?;
        }

        Ok(text)
    }
}

// =============================================================================
// Tests
// =============================================================================
