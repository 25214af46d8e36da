//! Cart request and response bodies

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use stallhub_app::domain::carts::models::{
    Cart, CartItem, CartSummary, CartValidation, UnavailableItem,
};
use uuid::Uuid;

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// Cart lines in the order they were first added
    pub items: Vec<CartItemResponse>,

    /// Sum of quantities across all lines
    pub item_count: u64,

    /// Sum of line totals in cents
    pub total: u64,

    /// Incremented on every change
    pub version: u64,

    /// Present on reads: whether every line can still be ordered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<CartValidationResponse>,

    pub created_at: String,
    pub updated_at: String,

    /// The cart is discarded after this time unless changed again
    pub expires_at: String,
}

impl From<CartSummary> for CartResponse {
    fn from(summary: CartSummary) -> Self {
        let CartSummary {
            cart,
            item_count,
            total,
        } = summary;

        Self {
            uuid: cart.uuid.into_uuid(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            item_count,
            total,
            version: cart.version,
            validation: None,
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
            expires_at: cart.expires_at.to_string(),
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartSummary::from(cart).into()
    }
}

impl CartResponse {
    pub(crate) fn with_validation(mut self, validation: CartValidation) -> Self {
        self.validation = Some(validation.into());
        self
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub quantity: u32,

    /// Price per unit in cents, captured when last added
    pub unit_price: u64,

    /// `unit_price * quantity`
    pub line_total: u64,

    pub scheduled_for: Option<String>,
    pub special_instructions: Option<String>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            line_total: item.line_total(),
            product_uuid: item.product_uuid.into_uuid(),
            stall_uuid: item.stall_uuid.into_uuid(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            scheduled_for: item.scheduled_for.as_ref().map(ToString::to_string),
            special_instructions: item.special_instructions,
        }
    }
}

/// Cart Validation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartValidationResponse {
    pub valid: bool,
    pub unavailable: Vec<UnavailableItemResponse>,
}

impl From<CartValidation> for CartValidationResponse {
    fn from(validation: CartValidation) -> Self {
        Self {
            valid: validation.valid,
            unavailable: validation
                .unavailable
                .into_iter()
                .map(UnavailableItemResponse::from)
                .collect(),
        }
    }
}

/// A line that can no longer be ordered
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UnavailableItemResponse {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,

    /// `product_not_found`, `product_inactive`, `stall_mismatch`,
    /// `stall_not_found` or `stall_inactive`
    pub reason: String,
}

impl From<UnavailableItem> for UnavailableItemResponse {
    fn from(item: UnavailableItem) -> Self {
        Self {
            product_uuid: item.product_uuid.into_uuid(),
            stall_uuid: item.stall_uuid.into_uuid(),
            reason: item.reason.as_str().to_string(),
        }
    }
}
