//! Server configuration module

use clap::Parser;
use stallhub_app::context::AppSettings;

use crate::config::{
    observability::{LoggingConfig, ObservabilityConfig},
    policy::{CartsConfig, OrdersConfig},
    server::ServerRuntimeConfig,
    storage::StorageConfig,
};

pub(crate) mod observability;
pub(crate) mod policy;
pub(crate) mod server;
pub(crate) mod storage;

/// Stallhub JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "stallhub-json", about = "Stallhub JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Row storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Cart lifetime settings.
    #[command(flatten)]
    pub carts: CartsConfig,

    /// Order pricing and validation settings.
    #[command(flatten)]
    pub orders: OrdersConfig,
}

/// Raised when the parsed arguments do not describe a usable setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is required when STORAGE_BACKEND=postgres")]
    MissingDatabaseUrl,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for building the application services.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage backend is missing its connection string.
    pub fn app_settings(&self) -> Result<AppSettings, ConfigError> {
        Ok(AppSettings {
            storage: self.storage.to_settings()?,
            carts: self.carts.to_policy(),
            orders: self.orders.to_policy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use stallhub_app::context::StorageSettings;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_use_memory_storage_and_standard_policies() -> TestResult {
        let config = ServerConfig::try_parse_from(["stallhub-json"])?;

        let settings = config.app_settings()?;

        assert_eq!(settings.storage, StorageSettings::Memory);
        assert_eq!(settings.carts.ttl, SignedDuration::from_hours(168));
        assert_eq!(settings.orders.delivery_fee, 500);
        assert_eq!(settings.orders.tax_rate_bps, 0);
        assert_eq!(settings.orders.currency, "USD");
        assert_eq!(config.socket_addr(), "0.0.0.0:8698");

        Ok(())
    }

    #[test]
    fn postgres_without_url_is_rejected() -> TestResult {
        let config =
            ServerConfig::try_parse_from(["stallhub-json", "--storage-backend", "postgres"])?;

        assert!(
            matches!(config.app_settings(), Err(ConfigError::MissingDatabaseUrl)),
            "postgres storage needs a database url"
        );

        Ok(())
    }

    #[test]
    fn postgres_with_url_is_accepted() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "stallhub-json",
            "--storage-backend",
            "postgres",
            "--database-url",
            "postgres://localhost/stallhub",
        ])?;

        assert_eq!(
            config.app_settings()?.storage,
            StorageSettings::Postgres {
                database_url: "postgres://localhost/stallhub".to_string()
            }
        );

        Ok(())
    }
}
