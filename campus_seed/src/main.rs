//! Entry point for the database seeding utility

use anyhow::Result;
use campus_seed::SeedConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "campus_seed=info".into()))
        .with(fmt::layer().with_target(false))
        .init();

    let config = SeedConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load seed configuration: {}", e))?;

    match config.rng_seed {
        Some(seed) => info!("Using RNG seed {}", seed),
        None => info!("No RNG seed configured, output will differ between runs"),
    }

    let summary = campus_seed::run(&config).await?;

    info!(
        "Database {} ready: {} users, {} items",
        config.database_url, summary.users, summary.items
    );
    Ok(())
}
