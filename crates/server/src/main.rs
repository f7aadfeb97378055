//! hn-pulse server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pulse_client::{ContentClient, HnClient, HnConfig, Uploader};
use pulse_core::{AppConfig, QueryCache};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
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

    let config = AppConfig::load()?;

    let api = HnClient::new(HnConfig::from(&config))?;
    let uploader: Option<Arc<dyn Uploader>> = match config.upload_url {
        Some(_) => Some(Arc::new(ContentClient::from_config(&config)?)),
        None => {
            tracing::info!("no upload_url configured, upload_content is disabled");
            None
        }
    };

    let cache = QueryCache::new(config.cache_options());
    cache.spawn_gc(config.gc_interval());

    tracing::info!(
        api = %config.api_base_url,
        stale_time_ms = config.stale_time_ms,
        gc_time_ms = config.gc_time_ms,
        "Starting hn-pulse server on stdio transport"
    );

    let handler = handler::HnPulseServer::new(config, Arc::new(api), cache.clone(), uploader);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    cache.shutdown().await;

    Ok(())
}
