//! HTTP client for the upstream completion API
//!
//! One `reqwest::Client` is built at startup and cloned into every request;
//! clones share the connection pool.

use crate::config::{ApiKey, UpstreamConfig};
use crate::error::{AppError, AppResult};
use crate::handlers::relay::UpstreamPayload;
use std::time::Duration;

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    /// Build a client from upstream configuration
    pub fn new(config: &UpstreamConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    /// Endpoint requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a completion request with the bearer credential attached
    ///
    /// Resolves once the response head has arrived. `deadline` bounds the
    /// whole exchange, body included; `None` leaves it open for streaming.
    pub async fn send(
        &self,
        api_key: &ApiKey,
        payload: &UpstreamPayload,
        deadline: Option<Duration>,
    ) -> AppResult<reqwest::Response> {
        let mut request = self
            .http
            .post(&self.url)
            .bearer_auth(api_key.expose())
            .json(payload);

        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        Ok(request.send().await?)
    }
}
