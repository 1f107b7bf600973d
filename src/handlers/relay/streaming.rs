//! Streaming relay policy
//!
//! Passes the client's `stream` flag through and pipes upstream bytes to the
//! caller as they arrive. Nothing is buffered or parsed: the body is polled
//! from upstream only when the caller polls, and dropping the response drops
//! the upstream connection.

use super::{finish, prepare};
use crate::config::ResponsePolicy;
use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use axum::{
    Extension,
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{HeaderValue, header},
    response::Response,
};
use futures::TryStreamExt;
use std::time::Instant;

const POLICY: ResponsePolicy = ResponsePolicy::Streaming;

/// POST /api/groq handler for the streaming policy
///
/// Returns as soon as upstream's response head arrives. On 2xx the body is
/// labelled `text/event-stream`; on other statuses upstream's own content
/// type is kept so JSON error bodies stay readable.
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
        stream = ?payload.stream,
        "Forwarding streaming completion request"
    );

    let started = Instant::now();
    let upstream = state.upstream().send(api_key, &payload, None).await?;
    let status = upstream.status();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        request_id = %request_id,
        upstream_status = status.as_u16(),
        upstream_duration_ms = %elapsed_ms,
        "Upstream stream opened"
    );

    if let Err(e) = state.metrics().record_upstream_duration(POLICY, elapsed_ms) {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to record upstream duration");
    }

    let upstream_content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();

    let metrics = state.metrics().clone();
    let stream = upstream
        .bytes_stream()
        .inspect_ok(move |chunk| metrics.add_stream_bytes(chunk.len()))
        .inspect_err(move |e| {
            tracing::warn!(
                request_id = %request_id,
                error = %e,
                "Upstream stream failed mid-response"
            );
        });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if status.is_success() {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    } else if let Some(content_type) = upstream_content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }

    Ok(response)
}
