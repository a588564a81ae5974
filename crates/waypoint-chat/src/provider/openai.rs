//! OpenAI-compatible chat-completions provider.
//!
//! Works against api.openai.com and the many local servers that mimic it.
//! The system contract travels as the `system` message; history and query
//! form the `user` message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ModelProvider;
use crate::error::ChatError;
use crate::prompt::ModelRequest;

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Option<Vec<OpenAIChoice>>,
    error: Option<OpenAIError>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIError {
    message: String,
}

fn build_request(model: &str, request: &ModelRequest) -> OpenAIRequest {
    OpenAIRequest {
        model: model.to_string(),
        messages: vec![
            OpenAIMessage {
                role: "system".to_string(),
                content: request.system().to_string(),
            },
            OpenAIMessage {
                role: "user".to_string(),
                content: request.render_conversation(),
            },
        ],
    }
}

fn extract_text(response: OpenAIResponse) -> Result<String, ChatError> {
    if let Some(error) = response.error {
        return Err(ChatError::Provider(format!("OpenAI error: {}", error.message)));
    }
    response
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message.content)
        .ok_or_else(|| ChatError::MalformedResponse("no content in first choice".to_string()))
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String, ChatError> {
        let api_request = build_request(&self.model, request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!(
                "OpenAI API error: {} - {}",
                status, body
            )));
        }

        let api_response: OpenAIResponse = response.json().await?;
        extract_text(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Turn;

    fn decode(body: &str) -> Result<String, ChatError> {
        extract_text(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_extracts_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "See [LOCATION]Pune, Maharashtra[/LOCATION]." }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        }"#;
        assert_eq!(decode(body).unwrap(), "See [LOCATION]Pune, Maharashtra[/LOCATION].");
    }

    #[test]
    fn test_null_content_is_malformed() {
        let body = r#"{ "choices": [{ "message": { "role": "assistant", "content": null } }] }"#;
        assert!(matches!(decode(body), Err(ChatError::MalformedResponse(_))));
    }

    #[test]
    fn test_error_object() {
        let body = r#"{ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } }"#;
        let err = decode(body).unwrap_err();
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[test]
    fn test_request_splits_system_and_conversation() {
        let history = vec![Turn::user("cafes?"), Turn::assistant("Try FC Road.")];
        let request = ModelRequest::compose("SYS", &history, 4, "and parks?");
        let json = serde_json::to_value(build_request("gpt-4o-mini", &request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "SYS");
        assert_eq!(json["messages"][1]["role"], "user");
        let user = json["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("User: cafes?"));
        assert!(user.ends_with("User Query: and parks?"));
    }
}
