//! HTTP request handlers for groq-relay

use crate::config::{Config, ResponsePolicy};
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::{cors_middleware, panic_response, request_id_middleware};
use crate::upstream::UpstreamClient;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod health;
pub mod metrics;
pub mod relay;

/// Application state shared across all handlers
///
/// Read-only after startup. All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    upstream: UpstreamClient,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the metrics registry cannot be built.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to initialize metrics: {}", e)))?;

        Ok(Self {
            config,
            upstream,
            metrics: Arc::new(metrics),
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the upstream client
    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

/// Relay route for the configured policy
fn relay_route(policy: ResponsePolicy) -> MethodRouter<AppState> {
    let post_handler = match policy {
        ResponsePolicy::Buffered => post(relay::buffered::handler),
        ResponsePolicy::Streaming => post(relay::streaming::handler),
    };

    post_handler
        .options(relay::preflight)
        .fallback(relay::method_not_allowed)
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let policy = state.config().upstream.policy;
    let body_limit = state.config().server.max_body_bytes;

    Router::new()
        .route(relay::RELAY_PATH, relay_route(policy))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
}
