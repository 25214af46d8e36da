//! Orders Data

use jiff::Timestamp;

use crate::domain::{
    carts::models::CartItemKey,
    catalog::models::{ProductUuid, StallUuid},
    orders::{
        OrderStatus,
        models::{DeliveryOption, OrderDetails, OrderUuid, PaymentMethod, PaymentStatus},
    },
};

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Client-chosen UUID. Resubmitting it returns the order already placed.
    pub uuid: Option<OrderUuid>,

    /// Explicit items. The customer's cart is used when absent.
    pub items: Option<Vec<NewOrderItem>>,

    pub scheduled_for: Timestamp,
    pub delivery_option: DeliveryOption,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_uuid: ProductUuid,
    pub stall_uuid: StallUuid,
    pub quantity: u32,

    /// Schedule of the cart line this item came from.
    pub scheduled_for: Option<Timestamp>,

    pub notes: Option<String>,
}

impl NewOrderItem {
    /// Key of the cart line this item consumes.
    #[must_use]
    pub const fn cart_key(&self) -> CartItemKey {
        CartItemKey {
            product_uuid: self.product_uuid,
            stall_uuid: self.stall_uuid,
            scheduled_for: self.scheduled_for,
        }
    }
}

/// Outcome of placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub details: OrderDetails,

    /// `false` when an order with the same UUID had already been placed.
    pub created: bool,
}

/// Order Update Data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

/// Reschedule Request Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub scheduled_for: Timestamp,
    pub reason: Option<String>,
}

/// Order listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}
