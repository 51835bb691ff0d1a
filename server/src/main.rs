mod server;
mod settings;
mod state;
mod web;

use anyhow::Result;
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    tracing::info!("Starting ant colony server");
    tracing::info!(
        "Population {}, generation {}s, mutation rate {} strength {}",
        settings.sim.evolution.population_size,
        settings.sim.evolution.generation_duration,
        settings.sim.evolution.mutation_rate,
        settings.sim.evolution.mutation_strength
    );

    server::run(settings).await
}
