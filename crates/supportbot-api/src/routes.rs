//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, rate
//! limiting, and all endpoint handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use supportbot_chat::SessionStore;
use supportbot_core::config::ServerConfig;
use supportbot_core::error::SupportError;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Request body limit for the JSON endpoints.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    // CORS: same-origin page plus its localhost alias.
    let origins: Vec<HeaderValue> = [
        format!("http://{}:{}", server.host, server.port),
        format!("http://127.0.0.1:{}", server.port),
        format!("http://localhost:{}", server.port),
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let limiter = RateLimiter::new(server.rate_limit_per_sec);

    let public_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health));

    let api_routes = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/add-faq", post(handlers::add_faq))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    public_routes
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured host and port.
pub async fn start_server(server: &ServerConfig, state: AppState) -> Result<(), SupportError> {
    let addr = format!("{}:{}", server.host, server.port);
    tokio::spawn(session_sweep_loop(
        Arc::clone(&state.sessions),
        SESSION_SWEEP_INTERVAL,
    ));
    let router = create_router(state);

    tracing::info!("Starting API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SupportError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| SupportError::Api(format!("Server error: {}", e)))?;

    Ok(())
}

/// Evict idle sessions periodically so the store stays bounded even when
/// no new sessions are being created.
async fn session_sweep_loop(sessions: Arc<SessionStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let evicted = sessions.purge_expired();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
    }
}
