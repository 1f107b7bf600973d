//! Prometheus metrics collection for groq-relay
//!
//! This module provides metrics instrumentation for tracking:
//! - Relay requests by response policy and outcome
//! - Upstream latency until the response head arrives
//! - Bytes piped to callers under the streaming policy
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::config::ResponsePolicy;
use crate::error::AppError;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Request outcome enum for type-safe metrics labels
///
/// Restricts the `outcome` label to a fixed set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Upstream answered 2xx and the body was relayed
    Success,
    /// Upstream answered non-2xx; status and body relayed
    UpstreamError,
    /// Upstream body was not JSON (buffered policy)
    UpstreamParseError,
    /// No credential configured
    MissingApiKey,
    /// Inbound body failed validation
    InvalidRequest,
    /// Anything else reported as a 500
    ServerError,
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::UpstreamError => "upstream_error",
            Outcome::UpstreamParseError => "upstream_parse_error",
            Outcome::MissingApiKey => "missing_api_key",
            Outcome::InvalidRequest => "invalid_request",
            Outcome::ServerError => "server_error",
        }
    }

    /// Classify a relay error
    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::Upstream { .. } => Outcome::UpstreamError,
            AppError::UpstreamParse { .. } => Outcome::UpstreamParseError,
            AppError::MissingApiKey => Outcome::MissingApiKey,
            AppError::InvalidRequest { .. } | AppError::PayloadTooLarge { .. } => {
                Outcome::InvalidRequest
            }
            _ => Outcome::ServerError,
        }
    }
}

/// Metrics collector for groq-relay
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    requests_total: IntCounterVec,
    upstream_duration: HistogramVec,
    stream_bytes: IntCounter,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 2 policies x 6 outcomes
        let requests_total = IntCounterVec::new(
            Opts::new(
                "groq_relay_requests_total",
                "Total relay requests by response policy and outcome",
            ),
            &["policy", "outcome"],
        )?;

        let upstream_duration = HistogramVec::new(
            HistogramOpts::new(
                "groq_relay_upstream_duration_ms",
                "Time until the upstream response head (streaming) or full body (buffered) arrived, in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
            &["policy"],
        )?;

        let stream_bytes = IntCounter::new(
            "groq_relay_stream_bytes_total",
            "Total bytes piped from upstream to callers under the streaming policy",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(upstream_duration.clone()))?;
        registry.register(Box::new(stream_bytes.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            upstream_duration,
            stream_bytes,
        })
    }

    /// Count one finished relay request
    pub fn record_request(
        &self,
        policy: ResponsePolicy,
        outcome: Outcome,
    ) -> Result<(), prometheus::Error> {
        self.requests_total
            .get_metric_with_label_values(&[policy.as_str(), outcome.as_str()])?
            .inc();
        Ok(())
    }

    /// Record upstream latency in milliseconds
    pub fn record_upstream_duration(
        &self,
        policy: ResponsePolicy,
        duration_ms: f64,
    ) -> Result<(), prometheus::Error> {
        self.upstream_duration
            .get_metric_with_label_values(&[policy.as_str()])?
            .observe(duration_ms);
        Ok(())
    }

    /// Add relayed stream bytes
    pub fn add_stream_bytes(&self, bytes: usize) {
        self.stream_bytes.inc_by(bytes as u64);
    }

    /// Current request count for a policy/outcome pair
    pub fn requests_count(&self, policy: ResponsePolicy, outcome: Outcome) -> u64 {
        self.requests_total
            .get_metric_with_label_values(&[policy.as_str(), outcome.as_str()])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    /// Total stream bytes relayed so far
    pub fn stream_bytes_count(&self) -> u64 {
        self.stream_bytes.get()
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        tracing::debug!(
            metric_family_count = metric_families.len(),
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Metrics output was not valid UTF-8: {}", e))
        })
    }
}
