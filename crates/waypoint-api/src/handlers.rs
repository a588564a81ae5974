//! Route handler functions for all API endpoints.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use waypoint_chat::{ChatReply, Turn};

use crate::error::ApiError;
use crate::routes::MAX_BODY_BYTES;
use crate::state::AppState;

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model: String,
    pub history_turns: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<Turn>,
}

// =============================================================================
// Request parsing
// =============================================================================

/// Pull the `message` string out of a raw `/chat` body.
///
/// The body is parsed by hand so every malformed shape gets the same
/// `{ "error": ... }` 400 instead of the extractor's plain-text rejection.
fn parse_message(body: &[u8]) -> Result<String, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No message provided".to_string()));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Request body is not valid JSON: {}", e)))?;

    match value.get("message") {
        None | Some(Value::Null) => Err(ApiError::BadRequest("No message provided".to_string())),
        Some(Value::String(message)) => Ok(message.clone()),
        Some(_) => Err(ApiError::BadRequest("'message' must be a string".to_string())),
    }
}

// =============================================================================
// Handler functions
// =============================================================================

/// Map a body-read failure to the JSON error shape.
fn body_error(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            MAX_BODY_BYTES
        ))
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// POST /chat - run one message through the pipeline.
///
/// The body is taken raw so that read failures, including the size cap,
/// come back as JSON errors like every other rejection.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let body = body.map_err(body_error)?;
    let message = parse_message(&body)?;
    tracing::debug!(chars = message.chars().count(), "Received chat message");

    let reply = state.assistant.chat(&message).await?;
    Ok(Json(reply))
}

/// GET /health - liveness and model identification.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let history_turns = state.assistant.history()?.len();

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.assistant.model_name().to_string(),
        history_turns,
    }))
}

/// GET /history - the shared conversation context, oldest first.
pub async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, ApiError> {
    Ok(Json(HistoryResponse {
        turns: state.assistant.history()?,
    }))
}

/// DELETE /history - forget the shared conversation context.
pub async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.assistant.reset()?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request_message(result: Result<String, ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_message_ok() {
        assert_eq!(
            parse_message(br#"{"message": "cafes in Pune"}"#).unwrap(),
            "cafes in Pune"
        );
    }

    #[test]
    fn test_parse_message_ignores_extra_fields() {
        assert_eq!(
            parse_message(br#"{"message": "hi", "session": 4}"#).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_parse_message_missing() {
        assert_eq!(bad_request_message(parse_message(b"")), "No message provided");
        assert_eq!(bad_request_message(parse_message(b"{}")), "No message provided");
        assert_eq!(
            bad_request_message(parse_message(br#"{"message": null}"#)),
            "No message provided"
        );
    }

    #[test]
    fn test_parse_message_not_json() {
        let msg = bad_request_message(parse_message(b"message=hello"));
        assert!(msg.starts_with("Request body is not valid JSON"));
    }

    #[test]
    fn test_parse_message_wrong_type() {
        assert_eq!(
            bad_request_message(parse_message(br#"{"message": 42}"#)),
            "'message' must be a string"
        );
        assert_eq!(
            bad_request_message(parse_message(br#"["message"]"#)),
            "No message provided"
        );
    }
}
