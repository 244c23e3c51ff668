use std::path::PathBuf;

use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

use appforge::config::Config;
use appforge::server::AppForgeServer;

/// stdout carries the MCP protocol, so logs go to stderr without colour codes.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("appforge=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// `.env` next to the binary wins over one in the working directory, since MCP
/// clients launch servers from arbitrary directories.
fn load_dotenv() -> Option<PathBuf> {
    let beside_binary = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
        .filter(|path| path.is_file());

    match beside_binary {
        Some(path) => dotenvy::from_path(&path).ok().map(|_| path),
        None => dotenvy::dotenv().ok(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    match load_dotenv() {
        Some(path) => tracing::info!("loaded environment from {}", path.display()),
        None => tracing::debug!("no .env file found, using process environment"),
    }

    let config = Config::load();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        credentials = ?config.credentials,
        timeout_secs = config.generation.timeout.as_secs(),
        "appforge starting"
    );

    let service = AppForgeServer::new(config)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("failed to start MCP service: {e:?}"))?;

    let reason = service.waiting().await?;
    tracing::info!(?reason, "appforge stopped");
    Ok(())
}
