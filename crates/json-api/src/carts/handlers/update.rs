//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::{
    carts::models::CartItemKey,
    catalog::models::{ProductUuid, StallUuid},
};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Largest magnitude accepted before the quantity is treated as garbage.
const MAX_QUANTITY_MAGNITUDE: f64 = 1_000_000_000.0;

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,

    /// Schedule of the line to change; omit for unscheduled lines
    pub scheduled_for: Option<String>,

    /// New whole-number quantity. Zero or less removes the line.
    pub quantity: f64,
}

fn whole_quantity(quantity: f64) -> Result<i64, StatusError> {
    if !quantity.is_finite() || quantity.fract() != 0.0 || quantity.abs() > MAX_QUANTITY_MAGNITUDE
    {
        return Err(StatusError::bad_request().brief("quantity must be a whole number"));
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is integral and bounded above"
    )]
    let quantity = quantity as i64;

    Ok(quantity)
}

/// Update Cart Item Handler
///
/// Sets the quantity of one cart line.
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "No such cart line"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "carts.update_quantity",
    skip(json, depot),
    fields(customer_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let request = json.into_inner();

    let quantity = whole_quantity(request.quantity)?;

    let key = CartItemKey {
        product_uuid: ProductUuid::from_uuid(request.product_uuid),
        stall_uuid: StallUuid::from_uuid(request.stall_uuid),
        scheduled_for: request.scheduled_for.parse_timestamp("scheduled_for")?,
    };

    tracing::Span::current().record(
        "customer_uuid",
        tracing::field::display(caller.customer_uuid()),
    );

    let summary = state
        .app
        .carts
        .update_quantity(caller.customer_uuid(), key, quantity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
