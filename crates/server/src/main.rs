//! shellcache server entry point.
//!
//! Boots one gateway version from configuration and serves it as an MCP
//! server on stdio transport. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchClient, FetchConfig, Gateway, RecordingHost};
use shellcache_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let gateway_config = config.gateway().context("validating configuration")?;

    tracing::info!(
        origin = %gateway_config.origin,
        version = %gateway_config.version,
        db = %config.db_path.display(),
        "Starting shellcache server on stdio transport"
    );

    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let gateway = Arc::new(Gateway::new(gateway_config, cache, network, RecordingHost::default()));

    let handler = handler::ShellcacheServer::new(Arc::clone(&gateway));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    gateway.settle().await;

    Ok(())
}
