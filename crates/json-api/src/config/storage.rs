//! Storage Config

use std::path::PathBuf;

use clap::Args;
use stallhub_app::context::StorageSettings;

use crate::config::ConfigError;

/// Where rows are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// Process memory; lost on restart.
    Memory,

    /// `PostgreSQL` via `DATABASE_URL`.
    Postgres,
}

/// Row storage settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Storage backend (memory, postgres)
    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Memory)]
    pub storage_backend: StorageBackend,

    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Seed document applied at startup
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,
}

impl StorageConfig {
    pub(crate) fn to_settings(&self) -> Result<StorageSettings, ConfigError> {
        match self.storage_backend {
            StorageBackend::Memory => Ok(StorageSettings::Memory),
            StorageBackend::Postgres => self
                .database_url
                .clone()
                .map(|database_url| StorageSettings::Postgres { database_url })
                .ok_or(ConfigError::MissingDatabaseUrl),
        }
    }
}
