//! Structured 500 for handler panics
//!
//! Used with `tower_http::catch_panic::CatchPanicLayer::custom` so that a
//! panic inside a handler still produces the `server_error` JSON shape.

use crate::error::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Convert a caught panic payload into a JSON 500 response
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::server_error("Internal server error")),
    )
        .into_response()
}
