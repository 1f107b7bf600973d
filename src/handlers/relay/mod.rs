//! Credential-injecting relay to the upstream completion API
//!
//! `POST /api/groq` forwards a chat-completion request with the server-held
//! bearer credential attached. Exactly one of [`buffered::handler`] and
//! [`streaming::handler`] is mounted, chosen by `upstream.policy` at startup.
//! `OPTIONS` answers the CORS preflight; any other method is a 405.

pub mod buffered;
pub mod streaming;
mod types;

pub use types::{CompletionRequest, UpstreamPayload};

use crate::config::{ApiKey, ResponsePolicy};
use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::metrics::Outcome;
use crate::middleware::RequestId;
use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::Response,
};

/// Route the relay is mounted on
pub const RELAY_PATH: &str = "/api/groq";

/// Maximum number of characters of a non-JSON upstream body echoed back
pub const EXCERPT_CHARS: usize = 200;

/// `OPTIONS /api/groq`: empty 200, CORS headers come from middleware
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST or OPTIONS
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Leading characters of `text`, cut on a char boundary
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Shared front half of both policies: credential, read, parse, validate, default
///
/// The body arrives as the extractor's result so that a rejected body is
/// reported only after the credential check, and always as JSON.
fn prepare<'a>(
    state: &'a AppState,
    policy: ResponsePolicy,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<(&'a ApiKey, UpstreamPayload)> {
    // Checked before the body so a missing key is reported regardless of input.
    let api_key = state.config().api_key().ok_or(AppError::MissingApiKey)?;
    let body = body.map_err(|rejection| body_rejection(state, rejection))?;
    let payload =
        CompletionRequest::from_slice(&body)?.into_upstream(&state.config().defaults, policy)?;
    Ok((api_key, payload))
}

fn body_rejection(state: &AppState, rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            limit: state.config().server.max_body_bytes,
        }
    } else {
        AppError::MalformedBody(rejection.body_text())
    }
}

/// Record the outcome and log failures
fn finish(
    state: &AppState,
    policy: ResponsePolicy,
    request_id: RequestId,
    result: &AppResult<Response>,
) {
    let outcome = match result {
        Ok(response) if response.status().is_success() => Outcome::Success,
        Ok(_) => Outcome::UpstreamError,
        Err(err) => Outcome::from_error(err),
    };

    if let Err(err) = result {
        match outcome {
            Outcome::UpstreamError | Outcome::InvalidRequest => tracing::info!(
                request_id = %request_id,
                policy = policy.as_str(),
                status = err.status().as_u16(),
                error = %err,
                "Relay request rejected"
            ),
            _ => tracing::error!(
                request_id = %request_id,
                policy = policy.as_str(),
                status = err.status().as_u16(),
                error = %err,
                "Relay request failed"
            ),
        }
    }

    if let Err(e) = state.metrics().record_request(policy, outcome) {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            "Failed to record request metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_excerpt_truncates_long_text() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), EXCERPT_CHARS);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "ğ".repeat(300);
        let cut = excerpt(&text);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS);
        assert!(text.starts_with(&cut));
    }

    proptest! {
        #[test]
        fn prop_excerpt_is_bounded_prefix(text in ".{0,400}") {
            let cut = excerpt(&text);
            prop_assert!(text.starts_with(&cut));
            prop_assert!(cut.chars().count() <= EXCERPT_CHARS);
            if text.chars().count() <= EXCERPT_CHARS {
                prop_assert_eq!(cut, text);
            }
        }
    }
}
