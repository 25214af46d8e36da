//! App Router

use salvo::Router;

use crate::{auth, carts::handlers as carts, orders::handlers as orders};

/// Routes that require a bearer token.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .post(carts::add::handler)
                .put(carts::update::handler)
                .delete(carts::delete::handler),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .patch(orders::update::handler)
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(Router::with_path("reschedule").post(orders::reschedule::handler)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use salvo::{
        affix_state::inject,
        http::header::AUTHORIZATION,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use stallhub_app::{
        context::{AppServices, AppSettings, StorageSettings},
        domain::{carts::CartPolicy, orders::OrderPolicy},
        seed::Seed,
    };
    use testresult::TestResult;

    use crate::{
        carts::models::CartResponse, orders::models::OrderResponse, state::State,
    };

    use super::*;

    const CUSTOMER_TOKEN: &str = "sh_customer";
    const STAFF_TOKEN: &str = "sh_staff";
    const BUSINESS: &str = "0195a1d2-0000-7000-8000-000000000001";
    const STALL: &str = "0195a1d2-0000-7000-8000-000000000002";
    const PRODUCT: &str = "0195a1d2-0000-7000-8000-000000000003";

    async fn seeded_service() -> TestResult<Service> {
        let settings = AppSettings {
            storage: StorageSettings::Memory,
            carts: CartPolicy::default(),
            orders: OrderPolicy::default(),
        };

        let services = AppServices::connect(&settings).await?;

        let seed: Seed = serde_json::from_value(json!({
            "businesses": [{ "uuid": BUSINESS, "name": "Night Market Co" }],
            "stalls": [{ "uuid": STALL, "business_uuid": BUSINESS, "name": "Dumpling House" }],
            "products": [{ "uuid": PRODUCT, "stall_uuid": STALL, "name": "Dumplings", "price": 850 }],
            "api_tokens": [
                {
                    "token": CUSTOMER_TOKEN,
                    "caller": { "uuid": "0195a1d2-0000-7000-8000-0000000000c1", "role": "customer" }
                },
                {
                    "token": STAFF_TOKEN,
                    "caller": {
                        "uuid": "0195a1d2-0000-7000-8000-0000000000c2",
                        "role": "staff",
                        "business_uuid": BUSINESS
                    }
                }
            ]
        }))?;

        services.seed(&seed).await?;

        Ok(Service::new(
            Router::new()
                .hoop(inject(State::from_app_context(services.context())))
                .push(app_router()),
        ))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn routes_require_a_token() -> TestResult {
        let service = seeded_service().await?;

        let res = TestClient::get("http://example.com/cart")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn cart_to_fulfilled_order() -> TestResult {
        let service = seeded_service().await?;
        let later = Timestamp::now()
            .checked_add(SignedDuration::from_hours(2))?
            .to_string();

        let res = TestClient::post("http://example.com/cart")
            .add_header(AUTHORIZATION, bearer(CUSTOMER_TOKEN), true)
            .json(&json!({ "product_uuid": PRODUCT, "stall_uuid": STALL, "quantity": 2 }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let mut res = TestClient::post("http://example.com/orders")
            .add_header(AUTHORIZATION, bearer(CUSTOMER_TOKEN), true)
            .json(&json!({
                "scheduled_for": later,
                "delivery_option": "pickup",
                "payment_method": "cash",
            }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let order: OrderResponse = res.take_json().await?;

        assert_eq!(order.total, 1700);
        assert_eq!(order.stall_name.as_deref(), Some("Dumpling House"));

        let mut res = TestClient::get("http://example.com/cart")
            .add_header(AUTHORIZATION, bearer(CUSTOMER_TOKEN), true)
            .send(&service)
            .await;

        let cart: CartResponse = res.take_json().await?;

        assert!(cart.items.is_empty(), "ordered lines leave the cart");

        let res = TestClient::patch(format!("http://example.com/orders/{}", order.uuid))
            .add_header(AUTHORIZATION, bearer(CUSTOMER_TOKEN), true)
            .json(&json!({ "status": "confirmed" }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        for status in ["confirmed", "preparing", "ready", "completed"] {
            let res = TestClient::patch(format!("http://example.com/orders/{}", order.uuid))
                .add_header(AUTHORIZATION, bearer(STAFF_TOKEN), true)
                .json(&json!({ "status": status }))
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::OK), "moving to {status}");
        }

        let mut res = TestClient::get(format!("http://example.com/orders/{}", order.uuid))
            .add_header(AUTHORIZATION, bearer(CUSTOMER_TOKEN), true)
            .send(&service)
            .await;

        let order: OrderResponse = res.take_json().await?;

        assert_eq!(order.status, "fulfilled");
        assert_eq!(order.status_history.len(), 5);
        assert!(order.allowed_transitions.is_empty(), "fulfilled is terminal");

        Ok(())
    }
}
