//! Language-model providers.
//!
//! Every backend implements the same `ModelProvider` contract: one composed
//! `ModelRequest` in, the model's raw text out. Which backend runs is a
//! configuration choice; the orchestrator never knows.

pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use waypoint_core::config::{ModelBackend, ModelConfig};

use crate::error::ChatError;
use crate::prompt::ModelRequest;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Text-completion backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logging/identification.
    fn name(&self) -> &'static str;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Run one completion. Returns the text exactly as the model produced it.
    async fn complete(&self, request: &ModelRequest) -> Result<String, ChatError>;
}

/// Build the configured model provider.
///
/// For Gemini this tries the candidate models in order and keeps the first
/// one the API recognises.
pub async fn build_model_provider(config: &ModelConfig) -> Result<Arc<dyn ModelProvider>, ChatError> {
    let api_key = config.api_key()?;
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;
    let base_url = config.effective_base_url();
    let models = config.effective_models();

    let provider: Arc<dyn ModelProvider> = match config.provider {
        ModelBackend::Gemini => {
            Arc::new(GeminiProvider::connect(client, base_url, api_key, &models).await?)
        }
        ModelBackend::OpenAi => {
            let model = models
                .into_iter()
                .next()
                .ok_or_else(|| ChatError::Config("no model configured".to_string()))?;
            Arc::new(OpenAiProvider::new(client, base_url, api_key, model))
        }
    };

    tracing::info!(
        provider = provider.name(),
        model = provider.model(),
        "Model provider ready"
    );
    Ok(provider)
}
