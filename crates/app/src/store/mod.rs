//! Row Store
//!
//! The backing store is a plain key/row store: rows are JSON documents
//! addressed by `(collection, key)` and the only operations are get, put,
//! delete and prefix scan. Nothing here offers multi-row transactions, so
//! services order their writes so that a single row acts as the commit point.

use std::{fmt::Debug, marker::PhantomData};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

mod errors;
mod memory;
mod postgres;

pub use errors::StoreError;
pub use memory::InMemoryRowStore;
pub use postgres::PgRowStore;

/// Names of the collections used by the services.
pub mod collections {
    pub const CARTS: &str = "carts";
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "order_items";
    pub const ORDER_RESCHEDULES: &str = "order_reschedules";
    pub const CHECKOUTS: &str = "checkouts";
    pub const PRODUCTS: &str = "products";
    pub const STALLS: &str = "stalls";
    pub const BUSINESSES: &str = "businesses";
    pub const API_TOKENS: &str = "api_tokens";
}

/// Basic key/row persistence.
#[async_trait]
pub trait RowStore: Send + Sync + Debug {
    /// Fetch a single row.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or overwrite a row.
    async fn put(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove a row, returning whether it existed.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// All rows whose key starts with `prefix`, ordered by key.
    async fn scan(&self, collection: &str, prefix: &str)
    -> Result<Vec<(String, Value)>, StoreError>;
}

/// Typed view over one collection.
#[derive(Debug)]
pub(crate) struct Collection<T> {
    name: &'static str,
    rows: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: PhantomData,
        }
    }

    pub(crate) async fn get(
        &self,
        store: &dyn RowStore,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        store
            .get(self.name, key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    pub(crate) async fn put(
        &self,
        store: &dyn RowStore,
        key: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        store.put(self.name, key, serde_json::to_value(row)?).await
    }

    pub(crate) async fn delete(&self, store: &dyn RowStore, key: &str) -> Result<bool, StoreError> {
        store.delete(self.name, key).await
    }

    pub(crate) async fn scan(
        &self,
        store: &dyn RowStore,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError> {
        store
            .scan(self.name, prefix)
            .await?
            .into_iter()
            .map(|(_key, value)| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }
}
