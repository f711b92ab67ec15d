use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "parley.toml",
    "config/parley.toml",
    "crates/config/parley.toml",
    "../parley.toml",
    "../config/parley.toml",
    "../crates/config/parley.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub hub: HubConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            hub: HubConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://parley.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Tuning for the notification hub.
///
/// ```
/// use parley_config::HubConfig;
///
/// let hub = HubConfig::default();
/// assert_eq!(hub.poll_interval_seconds, 3);
/// assert_eq!(hub.snapshot_limit, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// How often the polling fallback re-scans subscribed conversations.
    #[serde(default = "HubConfig::default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum number of messages carried in a delivered snapshot.
    #[serde(default = "HubConfig::default_snapshot_limit")]
    pub snapshot_limit: i64,
}

impl HubConfig {
    const fn default_poll_interval() -> u64 {
        3
    }

    const fn default_snapshot_limit() -> i64 {
        50
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: Self::default_poll_interval(),
            snapshot_limit: Self::default_snapshot_limit(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use parley_config::load;
///
/// std::env::remove_var("PARLEY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .context("invalid default database url")?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .context("invalid default connection limit")?
        .set_default(
            "hub.poll_interval_seconds",
            i64::try_from(defaults.hub.poll_interval_seconds).unwrap_or(i64::MAX),
        )
        .context("invalid default poll interval")?
        .set_default("hub.snapshot_limit", defaults.hub.snapshot_limit)
        .context("invalid default snapshot limit")?;

    let environment_overrides = config::Environment::with_prefix("PARLEY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PARLEY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PARLEY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded parley configuration");
    Ok(config)
}
