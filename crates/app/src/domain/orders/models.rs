//! Order Models

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{Caller, CallerUuid, CustomerUuid},
    domain::{
        carts::models::{CartItemKey, CartUuid},
        catalog::models::{BusinessUuid, ProductUuid, StallUuid},
        orders::status::{Actor, OrderStatus},
    },
    uuids::TypedUuid,
};

/// Type-safe UUID for orders.
pub type OrderUuid = TypedUuid<Order>;

/// Type-safe UUID for order items.
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Type-safe UUID for reschedule records.
pub type RescheduleUuid = TypedUuid<Reschedule>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    Pickup,
    Delivery,
}

/// Payment method label. No payment is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    EWallet,
    BankTransfer,
}

macro_rules! label_enum {
    ($ty:ty { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = UnknownLabel;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(UnknownLabel(value.to_string())),
                }
            }
        }
    };
}

/// Returned when parsing an unrecognised enum label.
#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownLabel(String);

label_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
    Failed => "failed",
});

label_enum!(DeliveryOption {
    Pickup => "pickup",
    Delivery => "delivery",
});

label_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    EWallet => "e_wallet",
    BankTransfer => "bank_transfer",
});

/// One entry of an order's append-only status log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub at: Timestamp,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: OrderUuid,
    pub business_uuid: BusinessUuid,
    pub stall_uuid: StallUuid,
    pub customer_uuid: CustomerUuid,
    pub status: OrderStatus,
    pub scheduled_for: Timestamp,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub tax: u64,
    pub total: u64,
    pub currency: String,
    pub delivery_option: DeliveryOption,

    #[serde(default)]
    pub delivery_address: Option<String>,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub notes: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub status_history: Vec<StatusHistoryEntry>,
}

impl Order {
    /// The role `caller` plays for this order, if any. Stall staff wins
    /// when the caller is both.
    #[must_use]
    pub fn actor_for(&self, caller: &Caller) -> Option<Actor> {
        if caller.is_staff_of(self.business_uuid) {
            return Some(Actor::StallStaff);
        }

        (caller.customer_uuid() == self.customer_uuid).then_some(Actor::Customer)
    }
}

/// `OrderItem` Model
///
/// Priced when the order is placed and never repriced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Log entry for a change of promised time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reschedule {
    pub uuid: RescheduleUuid,
    pub order_uuid: OrderUuid,
    pub previous_scheduled_for: Timestamp,
    pub scheduled_for: Timestamp,

    #[serde(default)]
    pub reason: Option<String>,

    pub actor_uuid: CallerUuid,
    pub created_at: Timestamp,
}

/// The cart state an order was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartVersion {
    pub uuid: CartUuid,
    pub version: u64,
}

/// Cart lines an order still has to take out of its customer's cart.
///
/// Written before the order row and deleted once the lines are gone, so an
/// interrupted checkout is finished on retry rather than placed twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub order_uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,

    /// `None` when the order was placed from an explicit item list.
    #[serde(default)]
    pub source_cart: Option<CartVersion>,

    pub lines: Vec<CartItemKey>,
}

/// An order with everything needed to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub reschedules: Vec<Reschedule>,
    pub stall_name: Option<String>,
    pub business_name: Option<String>,
}

impl OrderDetails {
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// An order as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub order: Order,
    pub item_count: u64,
    pub stall_name: Option<String>,
    pub business_name: Option<String>,
}
