//! API token repository.

use crate::{
    auth::models::ApiTokenRecord,
    store::{Collection, RowStore, StoreError, collections},
};

#[derive(Debug)]
pub(crate) struct ApiTokensRepository {
    tokens: Collection<ApiTokenRecord>,
}

impl ApiTokensRepository {
    pub(crate) const fn new() -> Self {
        Self {
            tokens: Collection::new(collections::API_TOKENS),
        }
    }

    pub(crate) async fn find_by_hash(
        &self,
        store: &dyn RowStore,
        token_hash: &str,
    ) -> Result<Option<ApiTokenRecord>, StoreError> {
        self.tokens.get(store, token_hash).await
    }

    pub(crate) async fn save(
        &self,
        store: &dyn RowStore,
        token_hash: &str,
        record: &ApiTokenRecord,
    ) -> Result<(), StoreError> {
        self.tokens.put(store, token_hash, record).await
    }

    pub(crate) async fn delete(
        &self,
        store: &dyn RowStore,
        token_hash: &str,
    ) -> Result<bool, StoreError> {
        self.tokens.delete(store, token_hash).await
    }
}
