//! Configuration management for groq-relay
//!
//! Parses TOML configuration files and provides typed access to settings.
//! The upstream credential is never read from the file; it is taken from the
//! process environment once at startup and carried as an [`ApiKey`].

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream completion endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default environment variable holding the upstream credential
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(skip)]
    api_key: Option<ApiKey>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

/// How upstream responses are relayed to the caller
///
/// Chosen once per deployment; the router mounts exactly one relay handler.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePolicy {
    /// Force `stream: false`, read and parse the whole upstream body
    #[default]
    Buffered,
    /// Pass the client's `stream` flag through and pipe upstream bytes
    Streaming,
}

impl ResponsePolicy {
    /// Convert policy to a stable label string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponsePolicy::Buffered => "buffered",
            ResponsePolicy::Streaming => "streaming",
        }
    }
}

/// Upstream completion API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    #[serde(default)]
    pub policy: ResponsePolicy,
    /// Name of the environment variable the credential is read from
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Deadline for a whole buffered exchange. Streams have no total deadline.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            policy: ResponsePolicy::default(),
            api_key_env: default_api_key_env(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

/// Values filled in when the client omits them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestDefaults {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u64 {
    1024
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bearer credential for the upstream API
///
/// `Debug` never prints the secret and serialization skips it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential. Empty or whitespace-only values count as absent.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Read the credential from the named environment variable
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    /// The raw credential, for building the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Attach the credential named by `upstream.api_key_env`, if it is set
    pub fn load_api_key_from_env(self) -> Self {
        let key = ApiKey::from_env(&self.upstream.api_key_env);
        self.with_api_key(key)
    }

    /// Replace the credential
    pub fn with_api_key(mut self, key: Option<ApiKey>) -> Self {
        self.api_key = key;
        self
    }

    /// Credential loaded at startup, if any
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()` and `from_str()`, but can
    /// also be called explicitly when constructing Config via other means.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.max_body_bytes == 0 {
            return Err(AppError::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        let url = &self.upstream.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "upstream.url '{}' must start with 'http://' or 'https://'",
                url
            )));
        }

        if self.upstream.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "upstream.api_key_env must name an environment variable".to_string(),
            ));
        }

        for (name, timeout) in [
            ("connect_timeout_seconds", self.upstream.connect_timeout_seconds),
            ("request_timeout_seconds", self.upstream.request_timeout_seconds),
        ] {
            if timeout == 0 {
                return Err(AppError::Config(format!(
                    "upstream.{} must be greater than 0, got {}",
                    name, timeout
                )));
            }
            if timeout > 300 {
                return Err(AppError::Config(format!(
                    "upstream.{} cannot exceed 300 seconds (5 minutes), got {}",
                    name, timeout
                )));
            }
        }

        if self.defaults.model.trim().is_empty() {
            return Err(AppError::Config(
                "defaults.model must not be empty".to_string(),
            ));
        }

        let temperature = self.defaults.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "defaults.temperature must be a finite number between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if self.defaults.max_tokens == 0 {
            return Err(AppError::Config(
                "defaults.max_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[upstream]
url = "http://localhost:9999/openai/v1/chat/completions"
policy = "streaming"
api_key_env = "RELAY_TEST_KEY"
connect_timeout_seconds = 5
request_timeout_seconds = 30

[defaults]
model = "llama-3.3-70b-versatile"
temperature = 0.2
max_tokens = 2048

[observability]
log_level = "debug"
"#;

    #[test]
    fn test_config_from_str_parses_successfully() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.policy, ResponsePolicy::Streaming);
        assert_eq!(config.upstream.api_key_env, "RELAY_TEST_KEY");
        assert_eq!(config.upstream.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.defaults.model, "llama-3.3-70b-versatile");
        assert_eq!(config.defaults.temperature, 0.2);
        assert_eq!(config.defaults.max_tokens, 2048);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").expect("empty config should parse");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upstream.url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.upstream.policy, ResponsePolicy::Buffered);
        assert_eq!(config.upstream.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.defaults.model, "llama-3.1-8b-instant");
        assert_eq!(config.defaults.temperature, 0.7);
        assert_eq!(config.defaults.max_tokens, 1024);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_default_impl_matches_empty_file() {
        let from_default = Config::default();
        let from_empty = Config::from_str("").unwrap();
        assert_eq!(from_default.upstream.url, from_empty.upstream.url);
        assert_eq!(from_default.defaults.model, from_empty.defaults.model);
        assert!(from_default.validate().is_ok());
    }

    #[test]
    fn test_partial_section_fills_remaining_fields() {
        let config = Config::from_str("[defaults]\nmodel = \"gemma2-9b-it\"\n").unwrap();
        assert_eq!(config.defaults.model, "gemma2-9b-it");
        assert_eq!(config.defaults.temperature, 0.7);
        assert_eq!(config.defaults.max_tokens, 1024);
    }

    #[test]
    fn test_policy_rejects_unknown_value() {
        let result = Config::from_str("[upstream]\npolicy = \"websocket\"\n");
        assert!(matches!(result, Err(AppError::ConfigParseFailed { .. })));
    }

    #[test]
    fn test_config_validation_invalid_url_fails() {
        let result = Config::from_str("[upstream]\nurl = \"ftp://example.com\"\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_config_validation_zero_timeout_fails() {
        let result = Config::from_str("[upstream]\nrequest_timeout_seconds = 0\n");
        let err = result.expect_err("zero timeout should fail");
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn test_config_validation_excessive_timeout_fails() {
        let result = Config::from_str("[upstream]\nconnect_timeout_seconds = 301\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_temperature_out_of_range_fails() {
        let result = Config::from_str("[defaults]\ntemperature = 2.5\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_zero_max_tokens_fails() {
        let result = Config::from_str("[defaults]\nmax_tokens = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_zero_body_limit_fails() {
        let result = Config::from_str("[server]\nmax_body_bytes = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_empty_model_fails() {
        let result = Config::from_str("[defaults]\nmodel = \"  \"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_rejects_blank_values() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new("gsk_abc").unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("gsk_secret_value").unwrap();
        let config = Config::default().with_api_key(Some(key.clone()));
        let rendered = format!("{:?} {:?}", key, config);
        assert!(!rendered.contains("gsk_secret_value"));
        assert!(!rendered.contains("gsk_"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_api_key_from_unset_env_is_none() {
        assert!(ApiKey::from_env("GROQ_RELAY_TEST_VARIABLE_THAT_IS_NEVER_SET").is_none());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = Config::default().with_api_key(ApiKey::new("gsk_secret_value"));
        let rendered = toml::to_string(&config).expect("should serialize");
        assert!(!rendered.contains("gsk_secret_value"));
    }
}
