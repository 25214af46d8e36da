//! Remove Cart Items Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};
use stallhub_app::domain::{
    carts::models::CartItemSelector,
    catalog::models::{ProductUuid, StallUuid},
};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Items Handler
///
/// Empties the cart with `all=true`, otherwise removes every line matching
/// `product` and, when given, `stall` and `scheduled_for`.
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Items",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Lines removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "carts.remove",
    skip(all, product, stall, scheduled_for, depot),
    fields(customer_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    all: QueryParam<bool, false>,
    product: QueryParam<Uuid, false>,
    stall: QueryParam<Uuid, false>,
    scheduled_for: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let customer = caller.customer_uuid();

    tracing::Span::current().record("customer_uuid", tracing::field::display(customer));

    let carts = &state.app.carts;

    if all.into_inner().unwrap_or(false) {
        let cart = carts.clear(customer).await.map_err(into_status_error)?;

        tracing::info!("cleared cart");

        return Ok(Json(cart.into()));
    }

    let Some(product) = product.into_inner() else {
        return Err(StatusError::bad_request().brief("either all=true or product is required"));
    };

    let selector = CartItemSelector {
        product_uuid: ProductUuid::from_uuid(product),
        stall_uuid: stall.into_inner().map(StallUuid::from_uuid),
        scheduled_for: scheduled_for.into_inner().parse_timestamp("scheduled_for")?,
    };

    let cart = carts
        .remove_item(customer, selector)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use stallhub_app::domain::carts::MockCartsService;
    use testresult::TestResult;

    use crate::test_helpers::{TEST_CALLER, carts_service, make_cart, test_product, test_stall};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart").delete(handler))
    }

    #[tokio::test]
    async fn all_clears_the_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_clear()
            .once()
            .withf(|customer| *customer == TEST_CALLER.customer_uuid())
            .return_once(|_| Ok(make_cart()));
        carts.expect_remove_item().never();

        let res = TestClient::delete("http://example.com/cart?all=true")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn product_and_stall_narrow_the_selector() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_clear().never();
        carts
            .expect_remove_item()
            .once()
            .withf(|_, selector| {
                selector.product_uuid == test_product()
                    && selector.stall_uuid == Some(test_stall())
                    && selector.scheduled_for.is_none()
            })
            .return_once(|_, _| Ok(make_cart()));

        let res = TestClient::delete(format!(
            "http://example.com/cart?product={}&stall={}",
            test_product(),
            test_stall()
        ))
        .send(&make_service(carts))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn missing_product_is_a_bad_request() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_clear().never();
        carts.expect_remove_item().never();

        let res = TestClient::delete("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
