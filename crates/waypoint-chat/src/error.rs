//! Error types for the conversational pipeline.

use waypoint_core::error::WaypointError;

/// Errors from the chat pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("model provider error: {0}")]
    Provider(String),
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("context store error: {0}")]
    Context(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Whether the error is the caller's fault (bad input) rather than ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

impl From<WaypointError> for ChatError {
    fn from(err: WaypointError) -> Self {
        match err {
            WaypointError::Config(msg) => ChatError::Config(msg),
            other => ChatError::Provider(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            ChatError::MalformedResponse(err.to_string())
        } else {
            ChatError::Provider(err.to_string())
        }
    }
}
