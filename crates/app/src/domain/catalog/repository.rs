//! Catalog repository.

use crate::{
    domain::catalog::models::{Business, BusinessUuid, Product, ProductUuid, Stall, StallUuid},
    store::{Collection, RowStore, StoreError, collections},
};

#[derive(Debug)]
pub(crate) struct CatalogRepository {
    products: Collection<Product>,
    stalls: Collection<Stall>,
    businesses: Collection<Business>,
}

impl CatalogRepository {
    pub(crate) const fn new() -> Self {
        Self {
            products: Collection::new(collections::PRODUCTS),
            stalls: Collection::new(collections::STALLS),
            businesses: Collection::new(collections::BUSINESSES),
        }
    }

    pub(crate) async fn find_product(
        &self,
        store: &dyn RowStore,
        uuid: ProductUuid,
    ) -> Result<Option<Product>, StoreError> {
        self.products.get(store, &uuid.to_string()).await
    }

    pub(crate) async fn find_stall(
        &self,
        store: &dyn RowStore,
        uuid: StallUuid,
    ) -> Result<Option<Stall>, StoreError> {
        self.stalls.get(store, &uuid.to_string()).await
    }

    pub(crate) async fn find_business(
        &self,
        store: &dyn RowStore,
        uuid: BusinessUuid,
    ) -> Result<Option<Business>, StoreError> {
        self.businesses.get(store, &uuid.to_string()).await
    }

    pub(crate) async fn save_product(
        &self,
        store: &dyn RowStore,
        product: &Product,
    ) -> Result<(), StoreError> {
        self.products
            .put(store, &product.uuid.to_string(), product)
            .await
    }

    pub(crate) async fn save_stall(
        &self,
        store: &dyn RowStore,
        stall: &Stall,
    ) -> Result<(), StoreError> {
        self.stalls.put(store, &stall.uuid.to_string(), stall).await
    }

    pub(crate) async fn save_business(
        &self,
        store: &dyn RowStore,
        business: &Business,
    ) -> Result<(), StoreError> {
        self.businesses
            .put(store, &business.uuid.to_string(), business)
            .await
    }
}
