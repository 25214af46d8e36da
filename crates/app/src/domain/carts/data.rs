//! Carts Data

use jiff::Timestamp;

use crate::domain::catalog::models::{ProductUuid, StallUuid};

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub quantity: u32,

    /// Price shown to the customer. Looked up from the catalog when absent.
    pub unit_price: Option<u64>,

    pub scheduled_for: Option<Timestamp>,
    pub special_instructions: Option<String>,
}
