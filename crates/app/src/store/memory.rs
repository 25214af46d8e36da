//! In-memory row store.

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Bound,
    sync::{
        RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::Value;

use crate::store::{RowStore, StoreError};

type Rows = BTreeMap<String, BTreeMap<String, Value>>;

/// Row store kept in process memory.
///
/// Used for standalone runs and tests. Outages can be simulated either for
/// the whole store or for writes to individual collections.
#[derive(Debug, Default)]
pub struct InMemoryRowStore {
    rows: RwLock<Rows>,
    unavailable: AtomicBool,
    failing_writes: RwLock<BTreeSet<String>>,
}

impl InMemoryRowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the store were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make puts into `collection` fail while reads keep working.
    pub fn fail_writes_to(&self, collection: &str) {
        if let Ok(mut failing) = self.failing_writes.write() {
            failing.insert(collection.to_owned());
        }
    }

    /// Undo every [`Self::fail_writes_to`].
    pub fn restore_writes(&self) {
        if let Ok(mut failing) = self.failing_writes.write() {
            failing.clear();
        }
    }

    /// Number of rows held in `collection`.
    pub fn row_count(&self, collection: &str) -> usize {
        self.rows
            .read()
            .map(|rows| rows.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store marked unavailable".to_owned()));
        }

        Ok(())
    }

    fn check_writable(&self, collection: &str) -> Result<(), StoreError> {
        self.check_available()?;

        let failing = self
            .failing_writes
            .read()
            .map_err(|_poisoned| poisoned("write check"))?;

        if failing.contains(collection) {
            return Err(StoreError::Unavailable(format!(
                "writes to {collection} are failing"
            )));
        }

        Ok(())
    }
}

fn poisoned(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("row store lock poisoned during {operation}"))
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_available()?;

        let rows = self.rows.read().map_err(|_poisoned| poisoned("get"))?;

        Ok(rows.get(collection).and_then(|rows| rows.get(key)).cloned())
    }

    async fn put(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.check_writable(collection)?;

        let mut rows = self.rows.write().map_err(|_poisoned| poisoned("put"))?;

        rows.entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), value);

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        self.check_writable(collection)?;

        let mut rows = self.rows.write().map_err(|_poisoned| poisoned("delete"))?;

        Ok(rows
            .get_mut(collection)
            .and_then(|rows| rows.remove(key))
            .is_some())
    }

    async fn scan(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        self.check_available()?;

        let rows = self.rows.read().map_err(|_poisoned| poisoned("scan"))?;

        let Some(rows) = rows.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_row() -> TestResult {
        let store = InMemoryRowStore::new();

        store.put("carts", "a", json!({ "n": 1 })).await?;

        assert_eq!(store.get("carts", "a").await?, Some(json!({ "n": 1 })));
        assert_eq!(store.get("carts", "b").await?, None);
        assert_eq!(store.get("orders", "a").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn scan_only_returns_prefixed_keys_in_order() -> TestResult {
        let store = InMemoryRowStore::new();

        store.put("items", "o2/b", json!(3)).await?;
        store.put("items", "o1/b", json!(2)).await?;
        store.put("items", "o1/a", json!(1)).await?;
        store.put("items", "o10/a", json!(4)).await?;

        let rows = store.scan("items", "o1/").await?;

        assert_eq!(
            rows,
            vec![("o1/a".to_owned(), json!(1)), ("o1/b".to_owned(), json!(2))]
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() -> TestResult {
        let store = InMemoryRowStore::new();

        store.put("carts", "a", json!(1)).await?;

        assert!(store.delete("carts", "a").await?);
        assert!(!store.delete("carts", "a").await?);
        assert_eq!(store.row_count("carts"), 0);

        Ok(())
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = InMemoryRowStore::new();

        store.set_unavailable(true);

        assert!(matches!(
            store.get("carts", "a").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.put("carts", "a", Value::Null).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.scan("carts", "").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn failing_writes_are_scoped_to_one_collection() -> TestResult {
        let store = InMemoryRowStore::new();

        store.fail_writes_to("orders");

        assert!(store.put("orders", "a", json!(1)).await.is_err());

        store.put("carts", "a", json!(1)).await?;

        store.restore_writes();
        store.put("orders", "a", json!(1)).await?;

        Ok(())
    }
}
