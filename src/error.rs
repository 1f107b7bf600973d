//! Error types for groq-relay
//!
//! All errors implement `IntoResponse` for Axum handlers. Every variant maps to
//! a structured JSON body; nothing reaches the caller as a bare failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The upstream credential was not provided at startup.
    #[error("Server configuration error: API key not found")]
    MissingApiKey,

    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        code: Option<&'static str>,
    },

    /// The inbound body was larger than `server.max_body_bytes`.
    #[error("Request body exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The inbound body could not be read or was not syntactically valid JSON.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Invalid response from upstream API (status {status})")]
    UpstreamParse { status: StatusCode, excerpt: String },

    /// Upstream answered with a non-2xx JSON body; relayed verbatim.
    #[error("Upstream API returned {status}")]
    Upstream {
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("Upstream request failed: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            code: None,
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamParse { .. } => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => *status,
            Self::MissingApiKey
            | Self::MalformedBody(_)
            | Self::UpstreamRequest(_)
            | Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error body returned to callers
///
/// ```json
/// {
///   "error": {
///     "message": "...",
///     "type": "server_error",
///     "code": "missing_api_key"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn server_error(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: "server_error",
                code: None,
                details: None,
            },
        }
    }

    fn with_code(mut self, code: &'static str) -> Self {
        self.error.code = Some(code);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::MethodNotAllowed => {
                return (
                    status,
                    Json(serde_json::json!({ "error": "Method not allowed" })),
                )
                    .into_response();
            }
            Self::Upstream { status, body } => return (status, Json(body)).into_response(),
            Self::MissingApiKey => {
                ErrorBody::server_error(Self::MissingApiKey.to_string()).with_code("missing_api_key")
            }
            Self::InvalidRequest { message, code } => ErrorBody {
                error: ErrorDetail {
                    message,
                    error_type: "invalid_request_error",
                    code,
                    details: None,
                },
            },
            Self::PayloadTooLarge { limit } => ErrorBody {
                error: ErrorDetail {
                    message: Self::PayloadTooLarge { limit }.to_string(),
                    error_type: "invalid_request_error",
                    code: Some("request_too_large"),
                    details: None,
                },
            },
            Self::UpstreamParse { excerpt, .. } => ErrorBody {
                error: ErrorDetail {
                    message: "Invalid response from upstream API".to_string(),
                    error_type: "api_error",
                    code: None,
                    details: Some(excerpt),
                },
            },
            other => ErrorBody::server_error(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
