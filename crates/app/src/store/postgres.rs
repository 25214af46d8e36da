//! PostgreSQL row store.

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{PgPool, Row, query};

use crate::store::{RowStore, StoreError};

const GET_ROW_SQL: &str = include_str!("sql/get_row.sql");
const PUT_ROW_SQL: &str = include_str!("sql/put_row.sql");
const DELETE_ROW_SQL: &str = include_str!("sql/delete_row.sql");
const SCAN_ROWS_SQL: &str = include_str!("sql/scan_rows.sql");

/// Row store backed by a single `rows` table holding JSONB documents.
#[derive(Debug, Clone)]
pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let row = query(GET_ROW_SQL)
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.try_get("value")).transpose()?)
    }

    async fn put(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError> {
        query(PUT_ROW_SQL)
            .bind(collection)
            .bind(key)
            .bind(value)
            .bind(SqlxTimestamp::from(Timestamp::now()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let rows_affected = query(DELETE_ROW_SQL)
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn scan(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let rows = query(SCAN_ROWS_SQL)
            .bind(collection)
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Ok((row.try_get("key")?, row.try_get("value")?)))
            .collect()
    }
}
