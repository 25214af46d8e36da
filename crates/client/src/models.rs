//! Wire models shared with the JSON API.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client copy of a cart.
///
/// Counts and totals are always derived from `items`; the server's own
/// aggregates are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// `None` until the first successful sync.
    #[serde(default)]
    pub uuid: Option<Uuid>,

    #[serde(default)]
    pub items: Vec<CartLine>,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub expires_at: Option<Timestamp>,

    /// Availability check returned by `GET /cart`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<CartValidation>,
}

impl Cart {
    /// Sum of quantities across every line.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals in cents.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0, |total, line| total.saturating_add(line.line_total()))
    }

    /// Quantity of `product` across all stalls and schedules.
    #[must_use]
    pub fn quantity_of(&self, product: Uuid) -> u64 {
        self.items
            .iter()
            .filter(|line| line.product_uuid == product)
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    pub(crate) fn apply_add(&mut self, item: &AddItem) {
        if item.quantity == 0 {
            return;
        }

        let key = item.key();

        if let Some(line) = self.items.iter_mut().find(|line| line.key() == key) {
            line.quantity = line.quantity.saturating_add(item.quantity);

            if let Some(price) = item.unit_price {
                line.unit_price = price;
            }

            return;
        }

        self.items.push(CartLine {
            product_uuid: item.product_uuid,
            stall_uuid: item.stall_uuid,
            quantity: item.quantity,
            unit_price: item.unit_price.unwrap_or_default(),
            scheduled_for: item.scheduled_for,
            special_instructions: item.special_instructions.clone(),
        });
    }

    pub(crate) fn apply_set_quantity(&mut self, key: &LineKey, quantity: i64) {
        match u32::try_from(quantity) {
            Ok(quantity) if quantity > 0 => {
                if let Some(line) = self.items.iter_mut().find(|line| line.key() == *key) {
                    line.quantity = quantity;
                }
            }
            _ => self.items.retain(|line| line.key() != *key),
        }
    }

    pub(crate) fn apply_remove(&mut self, selector: &RemoveItem) {
        self.items.retain(|line| !selector.matches(line));
    }

    pub(crate) fn apply_clear(&mut self) {
        self.items.clear();
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub quantity: u32,

    /// Cents.
    pub unit_price: u64,

    #[serde(default)]
    pub scheduled_for: Option<Timestamp>,

    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl CartLine {
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartValidation {
    pub valid: bool,
    pub unavailable: Vec<UnavailableLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableLine {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub reason: String,
}

/// Identity of a cart line; additions with the same key merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<Timestamp>,
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl AddItem {
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey {
            product_uuid: self.product_uuid,
            stall_uuid: self.stall_uuid,
            scheduled_for: self.scheduled_for,
        }
    }
}

/// Lines to drop. Omitted fields match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveItem {
    pub product_uuid: Uuid,
    pub stall_uuid: Option<Uuid>,
    pub scheduled_for: Option<Timestamp>,
}

impl RemoveItem {
    #[must_use]
    pub fn matches(&self, line: &CartLine) -> bool {
        line.product_uuid == self.product_uuid
            && self.stall_uuid.is_none_or(|stall| stall == line.stall_uuid)
            && self
                .scheduled_for
                .is_none_or(|at| line.scheduled_for == Some(at))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    #[serde(alias = "completed")]
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Reusing the same UUID on retry returns the order already placed.
    pub uuid: Uuid,

    /// Ordered lines; the server cart is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NewOrderItem>>,

    pub scheduled_for: Timestamp,
    pub delivery_option: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,

    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&CartLine> for NewOrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_uuid: line.product_uuid,
            stall_uuid: line.stall_uuid,
            quantity: line.quantity,
            scheduled_for: line.scheduled_for,
            notes: line.special_instructions.clone(),
        }
    }
}

/// Body of `PATCH /orders/{order}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /orders/{order}/reschedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reschedule {
    pub scheduled_for: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub at: Timestamp,

    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Order as returned by the detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub uuid: Uuid,
    pub stall_uuid: Uuid,

    #[serde(default)]
    pub stall_name: Option<String>,

    #[serde(default)]
    pub business_name: Option<String>,

    pub status: OrderStatus,
    pub scheduled_for: Timestamp,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub tax: u64,
    pub total: u64,
    pub currency: String,
    pub payment_status: String,
    pub item_count: u64,

    #[serde(default)]
    pub items: Vec<OrderLine>,

    #[serde(default)]
    pub status_history: Vec<StatusChange>,

    /// Statuses this caller may request next.
    #[serde(default)]
    pub allowed_transitions: Vec<OrderStatus>,

    pub updated_at: Timestamp,
}

/// Order as returned by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub uuid: Uuid,

    #[serde(default)]
    pub stall_name: Option<String>,

    pub status: OrderStatus,
    pub scheduled_for: Timestamp,
    pub total: u64,
    pub currency: String,
    pub item_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct OrderList {
    pub orders: Vec<OrderSummary>,
}
