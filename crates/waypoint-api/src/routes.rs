//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, a body size cap, and a
//! per-second request limit on the chat endpoint.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use waypoint_core::{WaypointConfig, WaypointError};

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// CORS policy: any origin unless the config lists specific ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let limiter = RateLimiter::new(state.config.server.rate_limit_per_sec);

    let chat_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    let diagnostic_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/history",
            get(handlers::history).delete(handlers::clear_history),
        );

    chat_routes
        .merge(diagnostic_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `server.host:server.port` and serve until ctrl-c.
pub async fn start_server(config: &WaypointConfig, state: AppState) -> Result<(), WaypointError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WaypointError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "Starting API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WaypointError::Api(format!("Server error: {}", e)))?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
