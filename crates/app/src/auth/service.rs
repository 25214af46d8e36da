//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::{
        AuthServiceError, Caller, generate_api_token, hash_api_token, models::ApiTokenRecord,
        repository::ApiTokensRepository,
    },
    clock::Clock,
    store::RowStore,
};

#[derive(Debug)]
pub struct StoreAuthService {
    store: Arc<dyn RowStore>,
    clock: Arc<dyn Clock>,
    repository: ApiTokensRepository,
}

impl StoreAuthService {
    #[must_use]
    pub fn new(store: Arc<dyn RowStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            repository: ApiTokensRepository::new(),
        }
    }

    /// Issue a fresh bearer token for `caller`, returning the raw token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    pub async fn issue_api_token(&self, caller: Caller) -> Result<String, AuthServiceError> {
        let token = generate_api_token();

        self.register_api_token(&token, caller).await?;

        Ok(token)
    }

    /// Register a caller-chosen token, replacing any caller it was bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    pub async fn register_api_token(
        &self,
        token: &str,
        caller: Caller,
    ) -> Result<(), AuthServiceError> {
        let record = ApiTokenRecord {
            caller,
            created_at: self.clock.now(),
        };

        self.repository
            .save(self.store.as_ref(), &hash_api_token(token), &record)
            .await?;

        Ok(())
    }

    /// Revoke a token. Returns `true` if the token existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    pub async fn revoke_api_token(&self, token: &str) -> Result<bool, AuthServiceError> {
        Ok(self
            .repository
            .delete(self.store.as_ref(), &hash_api_token(token))
            .await?)
    }
}

#[async_trait]
impl AuthService for StoreAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Caller, AuthServiceError> {
        let bearer_token = bearer_token.trim();

        if bearer_token.is_empty() {
            return Err(AuthServiceError::NotFound);
        }

        self.repository
            .find_by_hash(self.store.as_ref(), &hash_api_token(bearer_token))
            .await?
            .map(|record| record.caller)
            .ok_or(AuthServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve the caller a bearer token was issued to.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Caller, AuthServiceError>;
}
