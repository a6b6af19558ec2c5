//! SlimeWars bot arena.
//!
//! Runs a single bot-versus-bot match configured from the environment and
//! logs the result.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actor;
mod arena;
mod config;
mod turk;

use config::ArenaConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ArenaConfig::from_env()?;

    info!("Starting SlimeWars arena...");

    let report = arena::run_match(&config).await?;
    info!("{}", serde_json::to_string(&report)?);

    Ok(())
}
