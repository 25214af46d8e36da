//! Reschedule Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use stallhub_app::domain::orders::{data::RescheduleRequest, models::OrderUuid};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Reschedule Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RescheduleOrderRequest {
    /// New RFC 3339 time; must be in the future
    pub scheduled_for: String,

    pub reason: Option<String>,
}

/// Reschedule Order Handler
///
/// Moves the promised time of a pending or confirmed order and logs the
/// change.
#[endpoint(
    tags("orders"),
    summary = "Reschedule Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order rescheduled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order can no longer be rescheduled"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "orders.reschedule",
    skip(order, json, depot),
    fields(caller_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<RescheduleOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let order = OrderUuid::from_uuid(order.into_inner());
    let body = json.into_inner();

    let request = RescheduleRequest {
        scheduled_for: body.scheduled_for.parse_timestamp("scheduled_for")?,
        reason: body.reason,
    };

    let span = tracing::Span::current();

    span.record("caller_uuid", tracing::field::display(caller.uuid));
    span.record("order_uuid", tracing::field::display(order));

    let details = state
        .app
        .orders
        .reschedule_order(&caller, order, request)
        .await
        .map_err(into_status_error)?;

    tracing::info!(scheduled_for = %details.order.scheduled_for, "rescheduled order");

    Ok(Json(OrderResponse::for_caller(details, &caller)))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::TestClient;
    use serde_json::json;
    use stallhub_app::domain::orders::{MockOrdersService, OrderStatus, OrdersServiceError};
    use testresult::TestResult;

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("orders/{order}/reschedule").post(handler)
    }

    #[tokio::test]
    async fn reschedule_is_forwarded() -> TestResult {
        let mut orders = MockOrdersService::new();
        let uuid = OrderUuid::new();
        let at: Timestamp = "2026-03-02T09:30:00Z".parse()?;

        orders
            .expect_reschedule_order()
            .once()
            .withf(move |_, u, request| {
                *u == uuid
                    && request.scheduled_for == at
                    && request.reason.as_deref() == Some("running late")
            })
            .return_once(move |_, _, _| Ok(make_order(uuid, OrderStatus::Pending)));

        let res = TestClient::post(format!("http://example.com/orders/{uuid}/reschedule"))
            .json(&json!({ "scheduled_for": "2026-03-02T09:30:00Z", "reason": "running late" }))
            .send(&orders_service(orders, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn preparing_orders_are_a_conflict() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_reschedule_order().once().return_once(|_, _, _| {
            Err(OrdersServiceError::NotReschedulable {
                status: OrderStatus::Preparing,
            })
        });

        let res = TestClient::post(format!(
            "http://example.com/orders/{}/reschedule",
            Uuid::now_v7()
        ))
        .json(&json!({ "scheduled_for": "2026-03-02T09:30:00Z" }))
        .send(&orders_service(orders, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn past_times_are_a_bad_request() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_reschedule_order()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::InvalidSchedule));

        let res = TestClient::post(format!(
            "http://example.com/orders/{}/reschedule",
            Uuid::now_v7()
        ))
        .json(&json!({ "scheduled_for": "2020-01-01T00:00:00Z" }))
        .send(&orders_service(orders, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
