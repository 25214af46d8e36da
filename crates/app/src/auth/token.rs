//! API token generation and hashing.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// API token prefix.
pub const API_TOKEN_PREFIX: &str = "sh_";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

/// Generate a new random bearer token.
#[must_use]
pub fn generate_api_token() -> String {
    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];
    OsRng.fill_bytes(&mut secret);

    let hex: String = secret.iter().map(|byte| format!("{byte:02x}")).collect();

    format!("{API_TOKEN_PREFIX}{hex}")
}

/// Digest under which a token is stored. Raw tokens are never persisted.
#[must_use]
pub fn hash_api_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
