//! Update Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::orders::{
    OrderStatus,
    data::StatusUpdate,
    models::{OrderUuid, PaymentStatus},
};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::record_order_transition,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Update Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderRequest {
    /// Next status; must be allowed from the current one
    pub status: Option<String>,

    /// `pending`, `paid`, `refunded` or `failed`
    pub payment_status: Option<String>,

    pub notes: Option<String>,
}

impl UpdateOrderRequest {
    fn into_status_update(self) -> Result<StatusUpdate, StatusError> {
        Ok(StatusUpdate {
            status: self
                .status
                .map(|status| status.parse::<OrderStatus>())
                .transpose()
                .or_400("could not parse \"status\"")?,
            payment_status: self
                .payment_status
                .map(|status| status.parse::<PaymentStatus>())
                .transpose()
                .or_400("could not parse \"payment_status\"")?,
            notes: self.notes,
        })
    }
}

/// Update Order Handler
///
/// Stall staff move an order through its lifecycle and record payment.
#[endpoint(
    tags("orders"),
    summary = "Update Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not staff of this stall"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "orders.update",
    skip(order, json, depot),
    fields(caller_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let order = OrderUuid::from_uuid(order.into_inner());
    let update = json.into_inner().into_status_update()?;
    let requested = update.status;

    let span = tracing::Span::current();

    span.record("caller_uuid", tracing::field::display(caller.uuid));
    span.record("order_uuid", tracing::field::display(order));

    let details = state
        .app
        .orders
        .update_order(&caller, order, update)
        .await
        .map_err(into_status_error)?;

    if let Some(status) = requested
        && details.order.status == status
    {
        record_order_transition(status);
    }

    tracing::info!(status = %details.order.status, "updated order");

    Ok(Json(OrderResponse::for_caller(details, &caller)))
}
