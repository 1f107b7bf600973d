//! Integration tests for CLI config command
//!
//! Verifies the generated template loads as a valid configuration.

use groq_relay::cli::generate_config_template;
use groq_relay::config::{Config, DEFAULT_UPSTREAM_URL, ResponsePolicy};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_generated_template_creates_valid_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, generate_config_template()).expect("Failed to write template");

    let config =
        Config::from_file(&config_path).expect("Generated template should load as valid Config");

    assert_eq!(config.upstream.url, DEFAULT_UPSTREAM_URL);
    assert_eq!(config.upstream.policy, ResponsePolicy::Buffered);
    assert_eq!(config.upstream.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.defaults.model, "llama-3.1-8b-instant");
    assert_eq!(config.defaults.temperature, 0.7);
    assert_eq!(config.defaults.max_tokens, 1024);
    assert!(config.api_key().is_none(), "template never carries a key");
}

#[test]
fn test_template_matches_builtin_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, generate_config_template()).unwrap();

    let from_template = Config::from_file(&config_path).unwrap();
    let builtin = Config::default();

    assert_eq!(from_template.server.port, builtin.server.port);
    assert_eq!(
        from_template.server.max_body_bytes,
        builtin.server.max_body_bytes
    );
    assert_eq!(
        from_template.upstream.request_timeout_seconds,
        builtin.upstream.request_timeout_seconds
    );
    assert_eq!(
        from_template.upstream.connect_timeout_seconds,
        builtin.upstream.connect_timeout_seconds
    );
}
