//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use stallhub_app::domain::orders::models::OrderUuid;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Returns one order with its items, reschedules and the statuses the caller
/// may move it to.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let details = state
        .app
        .orders
        .get_order(&caller, OrderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderResponse::for_caller(details, &caller)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use stallhub_app::domain::orders::{MockOrdersService, OrderStatus, OrdersServiceError};
    use testresult::TestResult;

    use crate::test_helpers::{make_order, orders_service, orders_service_as, test_staff};

    use super::*;

    fn route() -> Router {
        Router::with_path("orders/{order}").get(handler)
    }

    #[tokio::test]
    async fn staff_see_kitchen_transitions() -> TestResult {
        let mut orders = MockOrdersService::new();
        let uuid = OrderUuid::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |caller, u| *caller == test_staff() && *u == uuid)
            .return_once(move |_, _| Ok(make_order(uuid, OrderStatus::Confirmed)));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&orders_service_as(test_staff(), orders, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(
            body.allowed_transitions,
            vec!["preparing".to_string(), "cancelled".to_string()]
        );
        assert_eq!(body.stall_name.as_deref(), Some("Dumpling House"));

        Ok(())
    }

    #[tokio::test]
    async fn unrelated_order_is_not_found() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{}", Uuid::now_v7()))
            .send(&orders_service(orders, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn malformed_uuid_is_a_bad_request() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_get_order().never();

        let res = TestClient::get("http://example.com/orders/not-a-uuid")
            .send(&orders_service(orders, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
