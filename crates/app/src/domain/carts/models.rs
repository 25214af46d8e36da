//! Cart Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    auth::CustomerUuid,
    domain::catalog::models::{ProductUuid, StallUuid},
    uuids::TypedUuid,
};

/// Type-safe UUID for carts.
pub type CartUuid = TypedUuid<Cart>;

/// Cart Model
///
/// One per customer. Items keep insertion order and are unique by
/// [`CartItemKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub uuid: CartUuid,
    pub customer_uuid: CustomerUuid,
    pub items: Vec<CartItem>,

    /// Bumped on every mutation.
    pub version: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Cart {
    /// Sum of quantities across every line.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals in cents.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.line_total()))
    }

    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn position(&self, key: &CartItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == *key)
    }
}

/// `CartItem` Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub quantity: u32,

    /// Price snapshot taken when the line was last added to, in cents.
    pub unit_price: u64,

    #[serde(default)]
    pub scheduled_for: Option<Timestamp>,

    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl CartItem {
    #[must_use]
    pub const fn key(&self) -> CartItemKey {
        CartItemKey {
            product_uuid: self.product_uuid,
            stall_uuid: self.stall_uuid,
            scheduled_for: self.scheduled_for,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// Identity of a cart line. Additions with the same key merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemKey {
    pub product_uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub scheduled_for: Option<Timestamp>,
}

/// Selects lines for removal. Omitted fields match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItemSelector {
    pub product_uuid: ProductUuid,
    pub stall_uuid: Option<StallUuid>,
    pub scheduled_for: Option<Timestamp>,
}

impl CartItemSelector {
    #[must_use]
    pub fn matches(&self, item: &CartItem) -> bool {
        item.product_uuid == self.product_uuid
            && self.stall_uuid.is_none_or(|stall| stall == item.stall_uuid)
            && self
                .scheduled_for
                .is_none_or(|at| item.scheduled_for == Some(at))
    }
}

impl From<CartItemKey> for CartItemSelector {
    fn from(key: CartItemKey) -> Self {
        Self {
            product_uuid: key.product_uuid,
            stall_uuid: Some(key.stall_uuid),
            scheduled_for: key.scheduled_for,
        }
    }
}

/// A cart with its aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub cart: Cart,
    pub item_count: u64,
    pub total: u64,
}

impl From<Cart> for CartSummary {
    fn from(cart: Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            total: cart.total(),
            cart,
        }
    }
}

/// Why a cart line can no longer be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    ProductNotFound,
    ProductInactive,
    StallMismatch,
    StallNotFound,
    StallInactive,
}

impl UnavailableReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductNotFound => "product_not_found",
            Self::ProductInactive => "product_inactive",
            Self::StallMismatch => "stall_mismatch",
            Self::StallNotFound => "stall_not_found",
            Self::StallInactive => "stall_inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableItem {
    pub product_uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub reason: UnavailableReason,
}

/// Result of checking every cart line against current reference data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartValidation {
    pub valid: bool,
    pub unavailable: Vec<UnavailableItem>,
}
