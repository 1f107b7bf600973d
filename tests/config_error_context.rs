//! Tests for config error context preservation
//!
//! Verifies that configuration errors keep the original io/toml error as
//! their source and name the offending file.

use groq_relay::config::Config;
use groq_relay::error::AppError;
use std::error::Error;
use std::str::FromStr;
use tempfile::TempDir;

#[test]
fn test_config_file_read_error_preserves_io_error() {
    let err = Config::from_file("/nonexistent/path/to/config.toml")
        .expect_err("Reading nonexistent file should fail");

    assert!(
        err.to_string().contains("/nonexistent/path/to/config.toml"),
        "Error should include the file path, got: {}",
        err
    );

    let source = err.source().expect("Should have source error");
    assert!(
        source.is::<std::io::Error>(),
        "Source error should be io::Error, got: {:?}",
        source
    );
}

#[test]
fn test_config_parse_error_preserves_toml_error() {
    let invalid_toml = r#"
this is [[[[ not valid toml
it has {{{{ broken syntax
"#;

    let err = Config::from_str(invalid_toml).expect_err("Parsing invalid TOML should fail");
    let source = err.source().expect("Should have source error");
    assert!(
        source.is::<toml::de::Error>(),
        "Source error should be toml::de::Error, got: {:?}",
        source
    );
}

#[test]
fn test_config_validation_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(&path, "[upstream]\nurl = \"api.groq.com\"\n").unwrap();

    let err = Config::from_file(&path).expect_err("url without scheme should fail");
    assert!(matches!(err, AppError::ConfigValidationFailed { .. }));
    assert!(err.to_string().contains("relay.toml"));
    assert!(err.to_string().contains("upstream.url"));
}
