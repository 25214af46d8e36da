//! Catalog Models

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Type-safe UUID for products.
pub type ProductUuid = TypedUuid<Product>;

/// Type-safe UUID for stalls.
pub type StallUuid = TypedUuid<Stall>;

/// Type-safe UUID for businesses.
pub type BusinessUuid = TypedUuid<Business>;

/// Product Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub name: String,

    /// Unit price in cents.
    pub price: u64,

    #[serde(default = "active")]
    pub active: bool,
}

/// Stall Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stall {
    pub uuid: StallUuid,
    pub business_uuid: BusinessUuid,
    pub name: String,

    #[serde(default = "active")]
    pub active: bool,

    /// Informational only, never enforced at checkout.
    #[serde(default)]
    pub capacity_per_day: Option<u32>,
}

/// Business Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub uuid: BusinessUuid,
    pub name: String,

    #[serde(default = "active")]
    pub active: bool,
}

const fn active() -> bool {
    true
}
