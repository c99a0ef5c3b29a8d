use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_CURRENCY, FEED_ROUTE_PREFIX};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
    pub feeds: FeedConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.trim_end_matches('/').to_string()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// External calendar polling.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between two scheduled sweeps. Zero is treated as one.
    pub interval_secs: u64,
    /// Seconds to wait after start before the first sweep.
    pub initial_delay_secs: u64,
    /// Pause between two properties inside one sweep.
    pub property_delay_ms: u64,
    /// Timeout of a single feed fetch.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl SyncConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        // A zero period panics `tokio::time::interval`.
        if self.interval_secs == 0 {
            return Duration::from_secs(1);
        }
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    #[must_use]
    pub const fn property_delay(&self) -> Duration {
        Duration::from_millis(self.property_delay_ms)
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 900,
            initial_delay_secs: 30,
            property_delay_ms: 2000,
            fetch_timeout_secs: 15,
            user_agent: default_user_agent(),
        }
    }
}

/// Outbound calendar feed publishing.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Directory the generated `.ics` files are written to.
    pub directory: String,
    /// Path under the server origin the feeds are served from.
    pub public_path: String,
}

impl FeedConfig {
    /// ## Summary
    /// Builds the public URL of a feed file.
    #[must_use]
    pub fn public_url(&self, origin: &str, filename: &str) -> String {
        format!(
            "{}/{}/{filename}",
            origin.trim_end_matches('/'),
            self.public_path.trim_matches('/')
        )
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            directory: "feeds".to_string(),
            public_path: FEED_ROUTE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("Stayline-CalendarSync/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "info")?
            .set_default("sync.interval_secs", 900)?
            .set_default("sync.initial_delay_secs", 30)?
            .set_default("sync.property_delay_ms", 2000)?
            .set_default("sync.fetch_timeout_secs", 15)?
            .set_default("sync.user_agent", default_user_agent())?
            .set_default("feeds.directory", "feeds")?
            .set_default("feeds.public_path", FEED_ROUTE_PREFIX)?
            .set_default("pricing.currency", DEFAULT_CURRENCY)?
            // Environment, `__` between nested keys
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
