//! The full chat pipeline behind one call.
//!
//! `GeoAssistant::chat` validates the message, gets the model's tagged answer,
//! extracts and geocodes the mentions, and assembles the reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use waypoint_core::WaypointConfig;

use crate::context::{ContextStore, Turn, DEFAULT_MAX_TURNS};
use crate::error::ChatError;
use crate::geocode::{GeocodingProvider, GeocodingResolver};
use crate::orchestrator::{QueryOrchestrator, DEFAULT_PROMPT_HISTORY_TURNS};
use crate::provider::ModelProvider;
use crate::response::{ChatReply, ResolutionTally, ResponseAssembler};
use crate::tags;

/// Pipeline tuning, usually derived from `WaypointConfig`.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub max_history_turns: usize,
    pub prompt_history_turns: usize,
    pub record_failed_exchanges: bool,
    pub max_message_chars: usize,
    /// Pause between successive geocoding calls.
    pub geocode_throttle: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_history_turns: DEFAULT_MAX_TURNS,
            prompt_history_turns: DEFAULT_PROMPT_HISTORY_TURNS,
            record_failed_exchanges: true,
            max_message_chars: 4000,
            geocode_throttle: Duration::from_millis(100),
        }
    }
}

impl ChatSettings {
    pub fn from_config(config: &WaypointConfig) -> Self {
        Self {
            max_history_turns: config.chat.max_history_turns,
            prompt_history_turns: config.chat.prompt_history_turns,
            record_failed_exchanges: config.chat.record_failed_exchanges,
            max_message_chars: config.chat.max_message_chars,
            geocode_throttle: Duration::from_millis(config.geocoding.throttle_ms),
        }
    }
}

/// Conversational geospatial assistant.
///
/// One instance serves every request; its conversation context is shared.
pub struct GeoAssistant {
    orchestrator: QueryOrchestrator,
    resolver: GeocodingResolver,
    assembler: ResponseAssembler,
    max_message_chars: usize,
}

impl GeoAssistant {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        geocoder: Arc<dyn GeocodingProvider>,
        settings: ChatSettings,
    ) -> Self {
        let orchestrator =
            QueryOrchestrator::new(model, ContextStore::new(settings.max_history_turns))
                .with_history_window(settings.prompt_history_turns)
                .with_failed_exchanges(settings.record_failed_exchanges);

        Self {
            orchestrator,
            resolver: GeocodingResolver::new(geocoder, settings.geocode_throttle),
            assembler: ResponseAssembler,
            max_message_chars: settings.max_message_chars,
        }
    }

    /// Identifier of the model answering queries.
    pub fn model_name(&self) -> &str {
        self.orchestrator.provider().model()
    }

    pub fn model_provider_name(&self) -> &'static str {
        self.orchestrator.provider().name()
    }

    pub fn geocoder_name(&self) -> &'static str {
        self.resolver.provider_name()
    }

    /// Answer one user message.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = self.validate(message)?;
        let started = Instant::now();

        let raw = self.orchestrator.respond(message, None).await?;
        let mentions = tags::extract_mentions(&raw);
        debug!(mentions = mentions.len(), "Extracted location mentions");

        let resolutions = self.resolver.resolve_all(&mentions).await;
        let reply = self.assembler.assemble(&raw, &mentions, &resolutions);

        let tally = ResolutionTally::of(&mentions, &resolutions);
        info!(
            mentions = mentions.len(),
            resolved = tally.found,
            not_found = tally.not_found,
            failed = tally.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat request complete"
        );

        Ok(reply)
    }

    /// Retained conversation, oldest first.
    pub fn history(&self) -> Result<Vec<Turn>, ChatError> {
        self.orchestrator.context().snapshot()
    }

    /// Forget the conversation.
    pub fn reset(&self) -> Result<(), ChatError> {
        self.orchestrator.context().clear()?;
        info!("Conversation history cleared");
        Ok(())
    }

    /// Blank input is rejected; accepted input is passed on verbatim.
    fn validate<'a>(&self, message: &'a str) -> Result<&'a str, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_chars {
            return Err(ChatError::MessageTooLong(self.max_message_chars));
        }
        Ok(message)
    }
}

// =============================================================================
// Tests
// =============================================================================
