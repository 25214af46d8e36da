//! Order response bodies

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use stallhub_app::{
    auth::Caller,
    domain::orders::models::{
        OrderDetails, OrderItem, OrderSummary, Reschedule, StatusHistoryEntry,
    },
};
use uuid::Uuid;

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub business_uuid: Uuid,
    pub business_name: Option<String>,
    pub stall_uuid: Uuid,
    pub stall_name: Option<String>,
    pub customer_uuid: Uuid,

    /// `pending`, `confirmed`, `preparing`, `ready`, `fulfilled` or `cancelled`
    pub status: String,

    pub scheduled_for: String,

    /// Amounts in cents
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub tax: u64,
    pub total: u64,
    pub currency: String,

    pub delivery_option: String,
    pub delivery_address: Option<String>,
    pub payment_method: String,
    pub payment_status: String,
    pub notes: Option<String>,

    pub item_count: u64,
    pub items: Vec<OrderItemResponse>,
    pub reschedules: Vec<RescheduleResponse>,
    pub status_history: Vec<StatusHistoryResponse>,

    /// Statuses the requesting caller may move this order to
    pub allowed_transitions: Vec<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl OrderResponse {
    pub(crate) fn for_caller(details: OrderDetails, caller: &Caller) -> Self {
        let item_count = details.item_count();

        let OrderDetails {
            order,
            items,
            reschedules,
            stall_name,
            business_name,
        } = details;

        let allowed_transitions = order
            .actor_for(caller)
            .map(|actor| {
                order
                    .status
                    .allowed_transitions(actor)
                    .into_iter()
                    .map(|status| status.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            uuid: order.uuid.into_uuid(),
            business_uuid: order.business_uuid.into_uuid(),
            business_name,
            stall_uuid: order.stall_uuid.into_uuid(),
            stall_name,
            customer_uuid: order.customer_uuid.into_uuid(),
            status: order.status.to_string(),
            scheduled_for: order.scheduled_for.to_string(),
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            tax: order.tax,
            total: order.total,
            currency: order.currency,
            delivery_option: order.delivery_option.to_string(),
            delivery_address: order.delivery_address,
            payment_method: order.payment_method.to_string(),
            payment_status: order.payment_status.to_string(),
            notes: order.notes,
            item_count,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            reschedules: reschedules
                .into_iter()
                .map(RescheduleResponse::from)
                .collect(),
            status_history: order
                .status_history
                .into_iter()
                .map(StatusHistoryResponse::from)
                .collect(),
            allowed_transitions,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,

    /// Product name when the order was placed
    pub name: String,

    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,
    pub notes: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            notes: item.notes,
        }
    }
}

/// Reschedule Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RescheduleResponse {
    pub uuid: Uuid,
    pub previous_scheduled_for: String,
    pub scheduled_for: String,
    pub reason: Option<String>,
    pub actor_uuid: Uuid,
    pub created_at: String,
}

impl From<Reschedule> for RescheduleResponse {
    fn from(reschedule: Reschedule) -> Self {
        Self {
            uuid: reschedule.uuid.into_uuid(),
            previous_scheduled_for: reschedule.previous_scheduled_for.to_string(),
            scheduled_for: reschedule.scheduled_for.to_string(),
            reason: reschedule.reason,
            actor_uuid: reschedule.actor_uuid.into_uuid(),
            created_at: reschedule.created_at.to_string(),
        }
    }
}

/// Status History Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusHistoryResponse {
    pub status: String,
    pub at: String,
    pub notes: Option<String>,
}

impl From<StatusHistoryEntry> for StatusHistoryResponse {
    fn from(entry: StatusHistoryEntry) -> Self {
        Self {
            status: entry.status.to_string(),
            at: entry.at.to_string(),
            notes: entry.notes,
        }
    }
}

/// Order Summary Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderSummaryResponse {
    pub uuid: Uuid,
    pub stall_uuid: Uuid,
    pub stall_name: Option<String>,
    pub business_name: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub scheduled_for: String,
    pub total: u64,
    pub currency: String,
    pub item_count: u64,
    pub created_at: String,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(summary: OrderSummary) -> Self {
        let order = summary.order;

        Self {
            uuid: order.uuid.into_uuid(),
            stall_uuid: order.stall_uuid.into_uuid(),
            stall_name: summary.stall_name,
            business_name: summary.business_name,
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            scheduled_for: order.scheduled_for.to_string(),
            total: order.total,
            currency: order.currency,
            item_count: summary.item_count,
            created_at: order.created_at.to_string(),
        }
    }
}

/// Orders Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    pub orders: Vec<OrderSummaryResponse>,
}

#[cfg(test)]
mod tests {
    use stallhub_app::domain::orders::{OrderStatus, models::OrderUuid};

    use crate::test_helpers::{TEST_CALLER, make_order, test_staff};

    use super::*;

    #[test]
    fn customer_sees_only_cancellation_while_pending() {
        let details = make_order(OrderUuid::new(), OrderStatus::Pending);

        let response = OrderResponse::for_caller(details, &TEST_CALLER);

        assert_eq!(response.allowed_transitions, vec!["cancelled".to_string()]);
    }

    #[test]
    fn staff_sees_the_next_kitchen_steps() {
        let details = make_order(OrderUuid::new(), OrderStatus::Pending);

        let response = OrderResponse::for_caller(details, &test_staff());

        assert_eq!(
            response.allowed_transitions,
            vec!["confirmed".to_string(), "cancelled".to_string()]
        );
    }

    #[test]
    fn terminal_orders_allow_nothing() {
        let details = make_order(OrderUuid::new(), OrderStatus::Fulfilled);

        let response = OrderResponse::for_caller(details, &test_staff());

        assert!(
            response.allowed_transitions.is_empty(),
            "fulfilled is terminal"
        );
        assert_eq!(response.status, "fulfilled");
    }
}
