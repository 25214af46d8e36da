//! Test Helpers

use jiff::{SignedDuration, Timestamp};

use crate::{
    auth::Caller,
    clock::Clock,
    domain::{
        carts::{CartsService, data::NewCartItem, models::Cart},
        catalog::models::Product,
        orders::{
            OrdersService,
            data::{NewOrder, NewOrderItem},
            models::{DeliveryOption, OrderDetails, PaymentMethod},
        },
    },
    test::TestContext,
};

/// An hour after the context clock's current time.
pub(crate) fn in_an_hour(ctx: &TestContext) -> Timestamp {
    ctx.clock.now() + SignedDuration::from_hours(1)
}

/// Put `quantity` of `product` into the caller's cart at a nominal price.
pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    caller: &Caller,
    product: &Product,
    quantity: u32,
) -> Cart {
    ctx.carts
        .add_item(
            caller.customer_uuid(),
            NewCartItem {
                product_uuid: product.uuid,
                stall_uuid: product.stall_uuid,
                quantity,
                unit_price: Some(1),
                scheduled_for: None,
                special_instructions: None,
            },
        )
        .await
        .expect("Failed to add item to cart")
        .cart
}

/// A pickup order for an hour from now, drawing on the cart.
pub(crate) fn pickup_order(ctx: &TestContext) -> NewOrder {
    NewOrder {
        uuid: None,
        items: None,
        scheduled_for: in_an_hour(ctx),
        delivery_option: DeliveryOption::Pickup,
        delivery_address: None,
        special_instructions: None,
        payment_method: PaymentMethod::Cash,
    }
}

pub(crate) fn order_item(product: &Product, quantity: u32) -> NewOrderItem {
    NewOrderItem {
        product_uuid: product.uuid,
        stall_uuid: product.stall_uuid,
        quantity,
        scheduled_for: None,
        notes: None,
    }
}

/// Place a pickup order for one portion of dumplings.
pub(crate) async fn place_dumplings_order(ctx: &TestContext, caller: &Caller) -> OrderDetails {
    add_to_cart(ctx, caller, &ctx.dumplings, 1).await;

    ctx.orders
        .place_order(caller, pickup_order(ctx))
        .await
        .expect("Failed to place order")
        .details
}
