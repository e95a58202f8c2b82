mod api;
mod command;
mod config;
mod device;

use anyhow::Context;
use command::CommandRelay;
use config::RelayConfig;
use device::{CloudIotClient, TokenSource};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();

    info!("Echo relay starting");
    info!("  Device API: {}", config.api_endpoint);

    let tokens = TokenSource::from_config(config.access_token.clone(), &config.metadata_endpoint);
    match &tokens {
        TokenSource::Static(_) => info!("  Credentials: static access token"),
        TokenSource::MetadataServer { endpoint } => {
            info!("  Credentials: metadata server at {}", endpoint)
        }
    }

    let client = CloudIotClient::new(&config.api_endpoint, tokens, config.request_timeout())
        .context("Failed to build device API client")?;
    let relay = Arc::new(CommandRelay::new(Arc::new(client)));

    api::serve(relay, config.port).await
}
