//! Catalog
//!
//! Products, stalls and businesses are reference data owned elsewhere. The
//! services here only read them, apart from seeding.

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::CatalogError;
pub use service::*;
