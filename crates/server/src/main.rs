//! waystation server entry point.
//!
//! Loads configuration, opens the cache database, brings the gateway up
//! (install, then activate) and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use waystation_client::{FetchClient, FetchConfig, Gateway, GatewayConfig, Network};
use waystation_core::{AppConfig, CacheDb};

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(version = %config.version, db = %config.db_path.display(), "Starting waystation on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let gateway = Arc::new(Gateway::new(GatewayConfig::from_app_config(&config)?, db, network));

    bring_up(&gateway).await;

    let handler = handler::WaystationServer::new(Arc::clone(&gateway));
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    gateway.settle().await;
    Ok(())
}

/// Install and activate at startup. Failures leave the gateway in its current
/// state; `sw_install`/`sw_activate` can retry.
async fn bring_up(gateway: &Gateway) {
    if let Err(e) = gateway.install().await {
        tracing::warn!("startup install failed, serving uncontrolled: {e}");
        return;
    }
    if let Err(e) = gateway.activate().await {
        tracing::warn!("startup activate failed: {e}");
    }
}
