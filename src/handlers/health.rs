//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Whether an upstream credential was loaded at startup
    pub credential_configured: bool,
    /// Active response policy: "buffered" or "streaming"
    pub policy: &'static str,
}

/// Health check handler
///
/// Always 200: a missing credential is reported per request as a structured
/// error, not by taking the process out of rotation.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            credential_configured: state.config().api_key().is_some(),
            policy: state.config().upstream.policy.as_str(),
        }),
    )
}
