//! groq-relay - credential-injecting reverse proxy for Groq chat completions
//!
//! Browser and mobile clients POST chat-completion requests to `/api/groq`;
//! the relay fills in defaults, attaches the server-held API key and forwards
//! them upstream, relaying the reply (buffered JSON or a byte stream) with
//! CORS headers and structured errors.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod telemetry;
pub mod upstream;
