//! wikicache server entry point.
//!
//! Boots the MCP server on stdio transport and, when `WIKICACHE_HTTP_ADDR` is
//! set, the read-only REST layer alongside it. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use wikicache_client::WikipediaClient;
use wikicache_core::{AppConfig, CacheDb, WikiCache};

mod error;
mod handler;
mod rest;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = CacheDb::open(&config.db_path).await?;
    let client = WikipediaClient::from_app_config(&config)?;
    let cache = Arc::new(WikiCache::new(db.clone(), client, &config));

    if let Some(addr) = config.http_socket_addr()? {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "REST layer listening");
        let app = rest::router(db);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "REST layer stopped");
            }
        });
    }

    tracing::info!(db_path = %config.db_path.display(), "Starting wikicache server on stdio transport");

    let handler = handler::WikiCacheServer::new(cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
