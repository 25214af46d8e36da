//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::{
    carts::data::NewCartItem,
    catalog::models::{ProductUuid, StallUuid},
};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,
    pub stall_uuid: Uuid,

    /// Must be at least one
    pub quantity: u32,

    /// Price shown to the customer in cents; looked up when omitted
    pub unit_price: Option<u64>,

    /// RFC 3339 time the item is wanted for
    pub scheduled_for: Option<String>,

    pub special_instructions: Option<String>,
}

impl AddCartItemRequest {
    fn into_new_cart_item(self) -> Result<NewCartItem, StatusError> {
        Ok(NewCartItem {
            product_uuid: ProductUuid::from_uuid(self.product_uuid),
            stall_uuid: StallUuid::from_uuid(self.stall_uuid),
            quantity: self.quantity,
            unit_price: self.unit_price,
            scheduled_for: self.scheduled_for.parse_timestamp("scheduled_for")?,
            special_instructions: self.special_instructions,
        })
    }
}

/// Add Cart Item Handler
///
/// Adds a product to the caller's cart. Adding a product that is already in
/// the cart for the same stall and schedule increases its quantity.
#[endpoint(
    tags("carts"),
    summary = "Add Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "carts.add_item",
    skip(json, depot),
    fields(customer_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let item = json.into_inner().into_new_cart_item()?;

    tracing::Span::current().record(
        "customer_uuid",
        tracing::field::display(caller.customer_uuid()),
    );

    let summary = state
        .app
        .carts
        .add_item(caller.customer_uuid(), item)
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
