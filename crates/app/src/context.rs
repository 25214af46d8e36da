//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthService, StoreAuthService},
    clock::{Clock, SystemClock},
    database,
    domain::{
        carts::{CartPolicy, CartsService, StoreCartsService},
        catalog::{CatalogService, StoreCatalogService},
        orders::{OrderPolicy, OrdersService, StoreOrdersService},
    },
    seed::{Seed, SeedError},
    store::{InMemoryRowStore, PgRowStore, RowStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migration(#[source] MigrateError),
}

/// Where rows are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSettings {
    /// Process memory. Nothing survives a restart.
    Memory,

    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub carts: CartPolicy,
    pub orders: OrderPolicy,
}

/// Service handles shared by request handlers.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

/// Concrete services wired to one store.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub catalog: Arc<StoreCatalogService>,
    pub carts: Arc<StoreCartsService>,
    pub orders: Arc<StoreOrdersService>,
    pub auth: Arc<StoreAuthService>,
}

impl AppServices {
    /// Build services over the configured storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting to or migrating the database fails.
    pub async fn connect(settings: &AppSettings) -> Result<Self, AppInitError> {
        let store: Arc<dyn RowStore> = match &settings.storage {
            StorageSettings::Memory => {
                info!("using in-memory storage");

                Arc::new(InMemoryRowStore::new())
            }
            StorageSettings::Postgres { database_url } => {
                let pool = database::connect(database_url)
                    .await
                    .map_err(AppInitError::Database)?;

                database::migrate(&pool)
                    .await
                    .map_err(AppInitError::Migration)?;

                info!("using postgres storage");

                Arc::new(PgRowStore::new(pool))
            }
        };

        Ok(Self::from_store(store, Arc::new(SystemClock), settings))
    }

    /// Build services over an existing store and clock.
    #[must_use]
    pub fn from_store(
        store: Arc<dyn RowStore>,
        clock: Arc<dyn Clock>,
        settings: &AppSettings,
    ) -> Self {
        let catalog = Arc::new(StoreCatalogService::new(store.clone()));

        let carts = Arc::new(StoreCartsService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            settings.carts,
        ));

        let orders = Arc::new(StoreOrdersService::new(
            store.clone(),
            catalog.clone(),
            carts.clone(),
            clock.clone(),
            settings.orders.clone(),
        ));

        let auth = Arc::new(StoreAuthService::new(store, clock));

        Self {
            catalog,
            carts,
            orders,
            auth,
        }
    }

    /// Load reference data and API tokens.
    ///
    /// # Errors
    ///
    /// Returns an error when any row cannot be written.
    pub async fn seed(&self, seed: &Seed) -> Result<(), SeedError> {
        self.catalog.import(&seed.catalog).await?;

        for token in &seed.api_tokens {
            self.auth
                .register_api_token(&token.token, token.caller.clone())
                .await?;
        }

        info!(api_tokens = seed.api_tokens.len(), "applied seed data");

        Ok(())
    }

    /// Trait-object handles for the HTTP layer.
    #[must_use]
    pub fn context(&self) -> AppContext {
        AppContext {
            catalog: self.catalog.clone(),
            carts: self.carts.clone(),
            orders: self.orders.clone(),
            auth: self.auth.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        auth::{Caller, CallerUuid, Role},
        seed::SeedToken,
    };

    use super::*;

    #[tokio::test]
    async fn seeded_tokens_authenticate() -> TestResult {
        let settings = AppSettings {
            storage: StorageSettings::Memory,
            carts: CartPolicy::default(),
            orders: OrderPolicy::default(),
        };

        let services = AppServices::connect(&settings).await?;

        let caller = Caller {
            uuid: CallerUuid::new(),
            role: Role::Customer,
            business_uuid: None,
        };

        services
            .seed(&Seed {
                api_tokens: vec![SeedToken {
                    token: "sh_seeded".to_string(),
                    caller: caller.clone(),
                }],
                ..Seed::default()
            })
            .await?;

        let context = services.context();

        assert_eq!(context.auth.authenticate_bearer("sh_seeded").await?, caller);

        Ok(())
    }
}
