//! Carts repository.

use crate::{
    auth::CustomerUuid,
    domain::carts::models::Cart,
    store::{Collection, RowStore, StoreError, collections},
};

/// Carts keyed by the owning customer.
#[derive(Debug)]
pub(crate) struct CartsRepository {
    carts: Collection<Cart>,
}

impl CartsRepository {
    pub(crate) const fn new() -> Self {
        Self {
            carts: Collection::new(collections::CARTS),
        }
    }

    pub(crate) async fn find_cart(
        &self,
        store: &dyn RowStore,
        customer: CustomerUuid,
    ) -> Result<Option<Cart>, StoreError> {
        self.carts.get(store, &customer.to_string()).await
    }

    pub(crate) async fn save_cart(&self, store: &dyn RowStore, cart: &Cart) -> Result<(), StoreError> {
        self.carts
            .put(store, &cart.customer_uuid.to_string(), cart)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        store: &dyn RowStore,
        customer: CustomerUuid,
    ) -> Result<bool, StoreError> {
        self.carts.delete(store, &customer.to_string()).await
    }

    pub(crate) async fn all_carts(&self, store: &dyn RowStore) -> Result<Vec<Cart>, StoreError> {
        self.carts.scan(store, "").await
    }
}
