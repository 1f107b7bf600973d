//! Buffered relay policy
//!
//! Forces `stream: false`, reads the whole upstream body, and relays it as
//! JSON with upstream's status code.

use super::{excerpt, finish, prepare};
use crate::config::ResponsePolicy;
use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    response::{IntoResponse, Response},
};
use std::time::Instant;

const POLICY: ResponsePolicy = ResponsePolicy::Buffered;

/// POST /api/groq handler for the buffered policy
///
/// # Responses
///
/// - upstream 2xx with JSON: upstream status and body
/// - upstream non-2xx with JSON: upstream status and body, unchanged
/// - upstream body not JSON: 502 with a `details` excerpt of the raw text
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let result = relay(&state, request_id, body).await;
    finish(&state, POLICY, request_id, &result);
    result
}

async fn relay(
    state: &AppState,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let (api_key, payload) = prepare(state, POLICY, body)?;

    tracing::debug!(
        request_id = %request_id,
        model = %payload.model,
        messages_count = payload.messages.len(),
        "Forwarding buffered completion request"
    );

    let started = Instant::now();
    let deadline = state.config().upstream.request_timeout();
    let upstream = state
        .upstream()
        .send(api_key, &payload, Some(deadline))
        .await?;
    let status = upstream.status();
    let text = upstream.text().await?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        request_id = %request_id,
        upstream_status = status.as_u16(),
        upstream_duration_ms = %elapsed_ms,
        body_bytes = text.len(),
        "Upstream responded"
    );

    if let Err(e) = state.metrics().record_upstream_duration(POLICY, elapsed_ms) {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to record upstream duration");
    }

    let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        tracing::warn!(
            request_id = %request_id,
            upstream_status = status.as_u16(),
            error = %e,
            "Upstream body is not JSON"
        );
        AppError::UpstreamParse {
            status,
            excerpt: excerpt(&text),
        }
    })?;

    if !status.is_success() {
        return Err(AppError::Upstream { status, body });
    }

    Ok((status, Json(body)).into_response())
}
