use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WaypointError};

/// Top-level configuration for the Waypoint service.
///
/// Loaded from `~/.waypoint/config.toml` by default. Secrets never live in
/// this file: provider sections name the environment variable that holds
/// the key, and the key is read at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaypointConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl WaypointConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WaypointConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Reject values that would leave the service unable to run.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WaypointError::Config("server.port must be non-zero".into()));
        }
        if self.server.rate_limit_per_sec == 0 {
            return Err(WaypointError::Config(
                "server.rate_limit_per_sec must be non-zero".into(),
            ));
        }
        if self.model.timeout_secs == 0 || self.geocoding.timeout_secs == 0 {
            return Err(WaypointError::Config("timeouts must be non-zero".into()));
        }
        if self.chat.max_message_chars == 0 {
            return Err(WaypointError::Config(
                "chat.max_message_chars must be non-zero".into(),
            ));
        }
        if self.chat.prompt_history_turns > self.chat.max_history_turns {
            return Err(WaypointError::Config(format!(
                "chat.prompt_history_turns ({}) exceeds chat.max_history_turns ({})",
                self.chat.prompt_history_turns, self.chat.max_history_turns
            )));
        }
        if self.model.models.iter().any(|m| m.trim().is_empty()) {
            return Err(WaypointError::Config("model.models contains an empty name".into()));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum `/chat` requests accepted per second.
    pub rate_limit_per_sec: u64,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            rate_limit_per_sec: 20,
            cors_origins: Vec::new(),
        }
    }
}

/// Language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat-completions endpoint.
    #[serde(rename = "openai")]
    OpenAi,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::Gemini => "gemini",
            ModelBackend::OpenAi => "openai",
        }
    }
}

/// Language-model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelBackend,
    /// Candidate model names, tried in order at startup. Empty uses the
    /// provider's defaults.
    pub models: Vec<String>,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelBackend::default(),
            models: Vec::new(),
            base_url: None,
            api_key_env: None,
            timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    pub fn effective_models(&self) -> Vec<String> {
        if !self.models.is_empty() {
            return self.models.clone();
        }
        match self.provider {
            ModelBackend::Gemini => vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash".to_string(),
            ],
            ModelBackend::OpenAi => vec!["gpt-4o-mini".to_string()],
        }
    }

    pub fn effective_base_url(&self) -> String {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, ModelBackend::Gemini) => {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }
            (None, ModelBackend::OpenAi) => "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn effective_api_key_env(&self) -> String {
        match (&self.api_key_env, self.provider) {
            (Some(name), _) => name.clone(),
            (None, ModelBackend::Gemini) => "GEMINI_API_KEY".to_string(),
            (None, ModelBackend::OpenAi) => "OPENAI_API_KEY".to_string(),
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        read_key(&self.effective_api_key_env())
    }
}

/// Geocoding backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodingBackend {
    /// Google Maps Geocoding API (requires a key).
    #[default]
    Google,
    /// OpenStreetMap Nominatim (no key, strict usage policy).
    Nominatim,
}

impl GeocodingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodingBackend::Google => "google",
            GeocodingBackend::Nominatim => "nominatim",
        }
    }
}

/// Geocoding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingBackend,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// User-Agent sent with every request (Nominatim requires one).
    pub user_agent: String,
    /// Pause between successive geocoding calls, in milliseconds.
    pub throttle_ms: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocodingBackend::default(),
            base_url: None,
            api_key_env: None,
            user_agent: "waypoint-geo-assistant/0.1".to_string(),
            throttle_ms: 100,
            timeout_secs: 10,
        }
    }
}

impl GeocodingConfig {
    pub fn effective_base_url(&self) -> String {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, GeocodingBackend::Google) => "https://maps.googleapis.com/maps/api".to_string(),
            (None, GeocodingBackend::Nominatim) => {
                "https://nominatim.openstreetmap.org".to_string()
            }
        }
    }

    pub fn effective_api_key_env(&self) -> Option<String> {
        match (&self.api_key_env, self.provider) {
            (Some(name), _) => Some(name.clone()),
            (None, GeocodingBackend::Google) => Some("GOOGLE_MAPS_API_KEY".to_string()),
            (None, GeocodingBackend::Nominatim) => None,
        }
    }

    /// Read the API key, if the provider needs one.
    pub fn api_key(&self) -> Result<Option<String>> {
        self.effective_api_key_env()
            .map(|name| read_key(&name))
            .transpose()
    }
}

/// Conversation and request-shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Turns retained in the context store (8 = 4 exchanges).
    pub max_history_turns: usize,
    /// Most recent turns serialized into each model request.
    pub prompt_history_turns: usize,
    /// Whether an exchange whose model call failed is still recorded.
    pub record_failed_exchanges: bool,
    /// Longest accepted user message, in characters.
    pub max_message_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 8,
            prompt_history_turns: 4,
            record_failed_exchanges: true,
            max_message_chars: 4000,
        }
    }
}

fn read_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(WaypointError::Config(format!(
            "{} is missing! Please check your environment variables.",
            var
        ))),
    }
}
