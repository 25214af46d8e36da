//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::{
    domain::catalog::{
        errors::CatalogError,
        models::{Business, BusinessUuid, Product, ProductUuid, Stall, StallUuid},
        repository::CatalogRepository,
    },
    store::RowStore,
};

/// Reference data to load into the store in one go.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub businesses: Vec<Business>,

    #[serde(default)]
    pub stalls: Vec<Stall>,

    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug)]
pub struct StoreCatalogService {
    store: Arc<dyn RowStore>,
    repository: CatalogRepository,
}

impl StoreCatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            repository: CatalogRepository::new(),
        }
    }

    /// Write every business, stall and product in `data`, overwriting rows
    /// with the same UUID.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects a write.
    pub async fn import(&self, data: &CatalogData) -> Result<(), CatalogError> {
        let store = self.store.as_ref();

        for business in &data.businesses {
            self.repository.save_business(store, business).await?;
        }

        for stall in &data.stalls {
            self.repository.save_stall(store, stall).await?;
        }

        for product in &data.products {
            self.repository.save_product(store, product).await?;
        }

        tracing::info!(
            businesses = data.businesses.len(),
            stalls = data.stalls.len(),
            products = data.products.len(),
            "imported catalog"
        );

        Ok(())
    }
}

#[async_trait]
impl CatalogService for StoreCatalogService {
    async fn get_product(&self, uuid: ProductUuid) -> Result<Product, CatalogError> {
        self.repository
            .find_product(self.store.as_ref(), uuid)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    async fn get_stall(&self, uuid: StallUuid) -> Result<Stall, CatalogError> {
        self.repository
            .find_stall(self.store.as_ref(), uuid)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    async fn get_business(&self, uuid: BusinessUuid) -> Result<Business, CatalogError> {
        self.repository
            .find_business(self.store.as_ref(), uuid)
            .await?
            .ok_or(CatalogError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieve a single product.
    async fn get_product(&self, uuid: ProductUuid) -> Result<Product, CatalogError>;

    /// Retrieve a single stall.
    async fn get_stall(&self, uuid: StallUuid) -> Result<Stall, CatalogError>;

    /// Retrieve a single business.
    async fn get_business(&self, uuid: BusinessUuid) -> Result<Business, CatalogError>;
}
