//! Seed data
//!
//! A JSON document holding reference data and pre-shared API tokens, used to
//! populate a fresh store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    auth::{AuthServiceError, Caller},
    domain::catalog::{CatalogData, CatalogError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedToken {
    pub token: String,
    pub caller: Caller,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(flatten)]
    pub catalog: CatalogData,

    #[serde(default)]
    pub api_tokens: Vec<SeedToken>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file")]
    Parse(#[from] serde_json::Error),

    #[error("failed to import catalog")]
    Catalog(#[from] CatalogError),

    #[error("failed to register API token")]
    Auth(#[from] AuthServiceError),
}

impl Seed {
    /// Read a seed document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_file(path: &Path) -> Result<Self, SeedError> {
        let contents = tokio::fs::read(path).await?;

        Ok(serde_json::from_slice(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_flattened_catalog_and_tokens() -> TestResult {
        let seed: Seed = serde_json::from_value(serde_json::json!({
            "businesses": [{
                "uuid": "0196a0f2-7f2a-7b1a-9c41-3f0e5a1b2c3d",
                "name": "Night Market Co"
            }],
            "api_tokens": [{
                "token": "sh_demo",
                "caller": {
                    "uuid": "0196a0f2-7f2a-7b1a-9c41-3f0e5a1b2c3e",
                    "role": "customer"
                }
            }]
        }))?;

        assert_eq!(seed.catalog.businesses.len(), 1);
        assert!(seed.catalog.products.is_empty());
        assert_eq!(seed.api_tokens.len(), 1);
        assert_eq!(seed.api_tokens[0].caller.business_uuid, None);

        Ok(())
    }
}
