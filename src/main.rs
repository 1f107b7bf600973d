//! groq-relay HTTP server
//!
//! Starts an Axum web server that relays chat-completion requests upstream.

use clap::Parser;
use groq_relay::{
    cli::{Cli, Command, DEFAULT_CONFIG_PATH, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Configuration template written to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    // A missing file at the default path means "run with defaults"; an
    // explicitly named file must exist.
    let config = if cli.config == DEFAULT_CONFIG_PATH && !Path::new(&cli.config).exists() {
        Config::default()
    } else {
        Config::from_file(&cli.config)?
    };
    let config = config.load_api_key_from_env();

    telemetry::init(&config.observability.log_level);

    tracing::info!(
        "Starting groq-relay on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        upstream = %config.upstream.url,
        policy = config.upstream.policy.as_str(),
        "Relay configured"
    );
    if config.api_key().is_none() {
        tracing::warn!(
            env_var = %config.upstream.api_key_env,
            "Upstream API key not set; relay requests will fail with missing_api_key"
        );
    }

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| format!("Invalid server.host '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState::new(Arc::new(config))?;
    let app = handlers::router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
