//! Carts service errors.

use thiserror::Error;

use crate::{domain::catalog::CatalogError, store::StoreError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("cart item not found")]
    ItemNotFound,

    #[error("cart storage unavailable")]
    Unavailable(#[source] StoreError),
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        Self::Unavailable(error)
    }
}

impl From<CatalogError> for CartsServiceError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound => Self::Validation("product not found".to_string()),
            CatalogError::Store(source) => Self::Unavailable(source),
        }
    }
}
