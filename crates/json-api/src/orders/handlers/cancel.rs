//! Cancel Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::orders::{OrderStatus, models::OrderUuid};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::record_order_transition,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Cancel Order Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelOrderRequest {
    /// Recorded in the order's status history
    pub notes: Option<String>,
}

/// Cancel Order Handler
///
/// Customers may cancel while the order is pending. Stall staff may also
/// cancel a confirmed order. The body is optional.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order can no longer be cancelled"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "orders.cancel",
    skip(order, req, depot),
    fields(caller_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let order = OrderUuid::from_uuid(order.into_inner());

    let payload = req.payload().await.or_400("could not read request body")?;

    let request = if payload.is_empty() {
        CancelOrderRequest::default()
    } else {
        serde_json::from_slice::<CancelOrderRequest>(payload)
            .or_400("could not parse request body")?
    };

    let span = tracing::Span::current();

    span.record("caller_uuid", tracing::field::display(caller.uuid));
    span.record("order_uuid", tracing::field::display(order));

    let details = state
        .app
        .orders
        .cancel_order(&caller, order, request.notes)
        .await
        .map_err(into_status_error)?;

    record_order_transition(OrderStatus::Cancelled);

    tracing::info!("cancelled order");

    Ok(Json(OrderResponse::for_caller(details, &caller)))
}
