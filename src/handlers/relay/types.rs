//! Request shapes for the completion relay
//!
//! Only the fields the relay defaults are typed. Everything else the client
//! sends (`top_p`, `stop`, `tools`, ...) rides along in `extra` and is
//! forwarded untouched.

use crate::config::{RequestDefaults, ResponsePolicy};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, error::Category};

/// Inbound chat-completion request
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Value>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body sent to the upstream completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<Value>,
    pub temperature: f64,
    pub max_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompletionRequest {
    /// Parse an inbound body
    ///
    /// Syntax errors are reported as [`AppError::MalformedBody`] (500); a
    /// well-formed body with wrongly typed fields is an invalid request (400).
    pub fn from_slice(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body).map_err(|e| match e.classify() {
            Category::Data => AppError::InvalidRequest {
                message: e.to_string(),
                code: Some("invalid_field"),
            },
            Category::Syntax | Category::Eof | Category::Io => {
                AppError::MalformedBody(e.to_string())
            }
        })
    }

    /// Apply defaults and the stream policy, producing the upstream body
    ///
    /// `messages` must be present; it is otherwise opaque to the relay.
    pub fn into_upstream(
        self,
        defaults: &RequestDefaults,
        policy: ResponsePolicy,
    ) -> AppResult<UpstreamPayload> {
        let messages = self.messages.ok_or_else(|| AppError::InvalidRequest {
            message: "'messages' is a required property".to_string(),
            code: Some("missing_messages"),
        })?;

        let stream = match policy {
            ResponsePolicy::Buffered => Some(false),
            ResponsePolicy::Streaming => self.stream,
        };

        Ok(UpstreamPayload {
            model: self.model.unwrap_or_else(|| defaults.model.clone()),
            messages,
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            stream,
            extra: self.extra,
        })
    }
}
