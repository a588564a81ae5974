//! Gemini `generateContent` provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ModelProvider;
use crate::error::ChatError;
use crate::prompt::ModelRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    /// Pick the first candidate model the API knows about.
    ///
    /// Fails with a configuration error when none of them answers.
    pub async fn connect(
        client: Client,
        base_url: String,
        api_key: String,
        candidates: &[String],
    ) -> Result<Self, ChatError> {
        for name in candidates {
            match check_model(&client, &base_url, &api_key, name).await {
                Ok(()) => {
                    info!(model = %name, "Using Gemini model");
                    return Ok(Self::new(client, base_url, api_key, name.clone()));
                }
                Err(e) => warn!(model = %name, error = %e, "Gemini model unavailable"),
            }
        }
        Err(ChatError::Config(format!(
            "Could not initialize any Gemini model (tried: {})",
            candidates.join(", ")
        )))
    }
}

async fn check_model(
    client: &Client,
    base_url: &str,
    api_key: &str,
    model: &str,
) -> Result<(), ChatError> {
    let response = client
        .get(format!("{}/models/{}", base_url, model))
        .header(API_KEY_HEADER, api_key)
        .send()
        .await?;
    if response.status().is_success() {
        Ok(())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ChatError::Provider(format!("{} - {}", status, body)))
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[derive(Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Text of the first candidate's first part.
fn extract_text(response: GeminiResponse) -> Result<String, ChatError> {
    if let Some(error) = response.error {
        return Err(ChatError::Provider(format!("Gemini error: {}", error.message)));
    }
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChatError::Provider(format!("prompt blocked: {}", reason)));
    }
    response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| ChatError::MalformedResponse("no text in first candidate".to_string()))
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String, ChatError> {
        let api_request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiTextPart {
                    text: request.render(),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }

        let api_response: GeminiResponse = response.json().await?;
        extract_text(api_response)
    }
}
