use std::sync::Arc;

use anyhow::Result;
use parley_config::AppConfig;
use parley_database::initialize_database;
use parley_messaging::Messenger;
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Fully wired messaging core: database pool plus the messenger facade.
#[derive(Clone)]
pub struct CoreServices {
    pub db_pool: SqlitePool,
    pub messenger: Arc<Messenger>,
}

impl CoreServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database).await?;
        let messenger = Arc::new(Messenger::new(db_pool.clone(), &config.hub));

        info!(url = %config.database.url, "messaging core initialised");

        Ok(Self { db_pool, messenger })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
