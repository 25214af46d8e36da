//! List Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};
use stallhub_app::domain::orders::{OrderStatus, data::OrderFilter};

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        models::{OrderSummaryResponse, OrdersResponse},
    },
    state::State,
};

/// List Orders Handler
///
/// Customers see their own orders. Staff and owners see every order for
/// their business. Newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders visible to the caller"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status filter"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let filter = OrderFilter {
        status: status
            .into_inner()
            .map(|status| status.parse::<OrderStatus>())
            .transpose()
            .or_400("could not parse \"status\" query parameter")?,
    };

    let orders = state
        .app
        .orders
        .list_orders(&caller, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrdersResponse {
        orders: orders
            .into_iter()
            .map(OrderSummaryResponse::from)
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use stallhub_app::domain::orders::{
        MockOrdersService,
        models::{OrderSummary, OrderUuid},
    };
    use testresult::TestResult;

    use crate::test_helpers::{TEST_CALLER, make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders").get(handler))
    }

    fn summary(status: OrderStatus) -> OrderSummary {
        let details = make_order(OrderUuid::new(), status);

        OrderSummary {
            item_count: details.item_count(),
            order: details.order,
            stall_name: details.stall_name,
            business_name: details.business_name,
        }
    }

    #[tokio::test]
    async fn lists_orders_for_the_caller() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|caller, filter| *caller == TEST_CALLER && filter.status.is_none())
            .return_once(|_, _| {
                Ok(vec![
                    summary(OrderStatus::Ready),
                    summary(OrderStatus::Pending),
                ])
            });

        let mut res = TestClient::get("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrdersResponse = res.take_json().await?;

        assert_eq!(body.orders.len(), 2);
        assert_eq!(
            body.orders.first().map(|order| order.status.as_str()),
            Some("ready")
        );

        Ok(())
    }

    #[tokio::test]
    async fn completed_filter_maps_to_fulfilled() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|_, filter| filter.status == Some(OrderStatus::Fulfilled))
            .return_once(|_, _| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/orders?status=completed")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_filter_is_a_bad_request() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_list_orders().never();

        let res = TestClient::get("http://example.com/orders?status=lost")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
