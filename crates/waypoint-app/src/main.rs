//! Waypoint server binary - composition root.
//!
//! 1. Load `.env` and configuration
//! 2. Initialize tracing
//! 3. Connect the model and geocoding providers (fatal if misconfigured)
//! 4. Start the axum HTTP server

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use waypoint_api::routes;
use waypoint_api::state::AppState;
use waypoint_chat::{build_geocoder, build_model_provider, ChatSettings, GeoAssistant};
use waypoint_core::WaypointConfig;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Environment file first so API keys and overrides are visible below.
    let dotenv = dotenvy::dotenv();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = if args.config_is_explicit() {
        WaypointConfig::load(&config_file)?
    } else {
        WaypointConfig::load_or_default(&config_file)
    };
    config.server.port = args.resolve_port(config.server.port);
    config.server.host = args.resolve_host(&config.server.host);

    // Tracing. RUST_LOG wins over --log-level and the config value.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .init();

    tracing::info!("Starting Waypoint v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    // Providers.
    let model = match build_model_provider(&config.model).await {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, provider = config.model.provider.as_str(), "Model provider unavailable");
            return Err(e.into());
        }
    };
    let geocoder = match build_geocoder(&config.geocoding) {
        Ok(g) => g,
        Err(e) => {
            tracing::error!(error = %e, provider = config.geocoding.provider.as_str(), "Geocoding provider unavailable");
            return Err(e.into());
        }
    };

    let assistant = GeoAssistant::new(model, geocoder, ChatSettings::from_config(&config));
    tracing::info!(
        model = assistant.model_name(),
        geocoder = assistant.geocoder_name(),
        history_turns = config.chat.max_history_turns,
        "Chat pipeline ready"
    );

    // API server.
    let state = AppState::new(config.clone(), assistant);
    routes::start_server(&config, state).await?;

    Ok(())
}
