//! Place Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::{
    catalog::models::{ProductUuid, StallUuid},
    orders::{
        data::{NewOrder, NewOrderItem},
        models::{DeliveryOption, OrderUuid, PaymentMethod},
    },
};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::record_order_placed,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    /// Client-chosen UUID; resubmitting it returns the existing order
    pub uuid: Option<Uuid>,

    /// Items to order. The caller's cart is used when omitted.
    pub items: Option<Vec<CreateOrderItemRequest>>,

    /// RFC 3339 time the order is wanted for; must be in the future
    pub scheduled_for: String,

    /// `pickup` or `delivery`
    pub delivery_option: String,

    /// Required for delivery
    pub delivery_address: Option<String>,

    pub special_instructions: Option<String>,

    /// `cash`, `card`, `e_wallet` or `bank_transfer`
    pub payment_method: String,
}

/// Place Order Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderItemRequest {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,
    pub quantity: u32,

    /// Schedule of the cart line being ordered, if any
    pub scheduled_for: Option<String>,

    pub notes: Option<String>,
}

impl CreateOrderItemRequest {
    fn into_new_order_item(self) -> Result<NewOrderItem, StatusError> {
        Ok(NewOrderItem {
            product_uuid: ProductUuid::from_uuid(self.product_uuid),
            stall_uuid: StallUuid::from_uuid(self.stall_uuid),
            quantity: self.quantity,
            scheduled_for: self.scheduled_for.parse_timestamp("items.scheduled_for")?,
            notes: self.notes,
        })
    }
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, StatusError> {
        let items = self
            .items
            .map(|items| {
                items
                    .into_iter()
                    .map(CreateOrderItemRequest::into_new_order_item)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(NewOrder {
            uuid: self.uuid.map(OrderUuid::from_uuid),
            items,
            scheduled_for: self.scheduled_for.parse_timestamp("scheduled_for")?,
            delivery_option: self
                .delivery_option
                .parse::<DeliveryOption>()
                .or_400("could not parse \"delivery_option\"")?,
            delivery_address: self.delivery_address,
            special_instructions: self.special_instructions,
            payment_method: self
                .payment_method
                .parse::<PaymentMethod>()
                .or_400("could not parse \"payment_method\"")?,
        })
    }
}

/// Place Order Handler
///
/// Turns the caller's cart, or the given items, into an order for a single
/// stall. Ordered lines are removed from the cart.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::OK, description = "Order with this UUID already placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "UUID belongs to another order"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(caller_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let order = json.into_inner().into_new_order()?;

    let span = tracing::Span::current();

    span.record("caller_uuid", tracing::field::display(caller.uuid));

    let placed = state
        .app
        .orders
        .place_order(&caller, order)
        .await
        .map_err(into_status_error)?;

    let uuid = placed.details.order.uuid;

    span.record("order_uuid", tracing::field::display(uuid));

    if placed.created {
        record_order_placed();

        tracing::info!(total = placed.details.order.total, "placed order");

        res.add_header(LOCATION, format!("/orders/{uuid}"), true)
            .or_500("failed to set location header")?
            .status_code(StatusCode::CREATED);
    } else {
        res.status_code(StatusCode::OK);
    }

    Ok(Json(OrderResponse::for_caller(placed.details, &caller)))
}
