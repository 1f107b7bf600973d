//! Command-line interface for groq-relay
//!
//! Provides argument parsing and subcommand handling for the groq-relay binary.

use clap::{Parser, Subcommand};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Credential-injecting reverse proxy for Groq chat completions
#[derive(Parser)]
#[command(name = "groq-relay")]
#[command(version)]
#[command(about = "Credential-injecting reverse proxy for Groq chat completions")]
#[command(
    long_about = "groq-relay forwards chat-completion requests from browser or mobile clients \
    to the Groq API, attaching a server-held API key so it never reaches the client."
)]
pub struct Cli {
    /// Path to configuration file (built-in defaults are used if the default path is absent)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# groq-relay Configuration
# =========================
#
# The API key is NOT stored here. Export it in the environment variable
# named by upstream.api_key_env (GROQ_API_KEY by default).

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Largest accepted request body in bytes (larger bodies get a JSON 413)
max_body_bytes = 10485760

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM
# ─────────────────────────────────────────────────────────────────────────────

[upstream]
# Chat completions endpoint requests are forwarded to
url = "https://api.groq.com/openai/v1/chat/completions"

# Response policy:
#   - "buffered": force stream=false, read and validate the JSON reply
#   - "streaming": pass the client's stream flag through, pipe bytes as they arrive
policy = "buffered"

# Environment variable holding the bearer credential
api_key_env = "GROQ_API_KEY"

# Seconds to wait for a TCP/TLS connection
connect_timeout_seconds = 10

# Seconds allowed for a whole buffered exchange (streams are not bounded)
request_timeout_seconds = 60

# ─────────────────────────────────────────────────────────────────────────────
# REQUEST DEFAULTS
# ─────────────────────────────────────────────────────────────────────────────
#
# Applied when the client omits (or sends null for) the field.

[defaults]
model = "llama-3.1-8b-instant"
temperature = 0.7
max_tokens = 1024

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}
