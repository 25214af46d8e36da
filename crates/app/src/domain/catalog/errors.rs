//! Catalog errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog entry not found")]
    NotFound,

    #[error("catalog unavailable")]
    Store(#[from] StoreError),
}
