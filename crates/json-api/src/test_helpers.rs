//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use stallhub_app::{
    auth::{Caller, CallerUuid, MockAuthService, Role},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            models::{Cart, CartUuid},
        },
        catalog::{
            MockCatalogService,
            models::{BusinessUuid, ProductUuid, StallUuid},
        },
        orders::{
            MockOrdersService, OrderStatus,
            models::{DeliveryOption, Order, OrderDetails, OrderUuid, PaymentMethod, PaymentStatus},
        },
    },
};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_CALLER: Caller = Caller {
    uuid: CallerUuid::from_uuid(Uuid::nil()),
    role: Role::Customer,
    business_uuid: None,
};

pub(crate) const TEST_BUSINESS_UUID: BusinessUuid = BusinessUuid::from_uuid(Uuid::max());

/// A staff member of [`TEST_BUSINESS_UUID`].
pub(crate) fn test_staff() -> Caller {
    Caller {
        uuid: CallerUuid::from_uuid(Uuid::from_u128(7)),
        role: Role::Staff,
        business_uuid: Some(TEST_BUSINESS_UUID),
    }
}

/// Injects a fixed caller in place of the auth middleware.
pub(crate) struct InjectCaller(pub(crate) Caller);

#[salvo::handler]
impl InjectCaller {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_caller(self.0.clone());
        ctrl.call_next(req, depot, res).await;
    }
}

/// Mocks with no expectations; any call fails the test.
pub(crate) struct StrictMocks {
    pub(crate) catalog: MockCatalogService,
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) auth: MockAuthService,
}

impl StrictMocks {
    pub(crate) fn new() -> Self {
        Self {
            catalog: MockCatalogService::new(),
            carts: MockCartsService::new(),
            orders: MockOrdersService::new(),
            auth: MockAuthService::new(),
        }
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            catalog: Arc::new(self.catalog),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            auth: Arc::new(self.auth),
        })
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    StrictMocks {
        auth,
        ..StrictMocks::new()
    }
    .into_state()
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    let state = StrictMocks {
        carts,
        ..StrictMocks::new()
    }
    .into_state();

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(InjectCaller(TEST_CALLER))
            .push(route),
    )
}

pub(crate) fn orders_service_as(caller: Caller, orders: MockOrdersService, route: Router) -> Service {
    let state = StrictMocks {
        orders,
        ..StrictMocks::new()
    }
    .into_state();

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(InjectCaller(caller))
            .push(route),
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    orders_service_as(TEST_CALLER, orders, route)
}

pub(crate) fn make_cart() -> Cart {
    Cart {
        uuid: CartUuid::from_uuid(Uuid::from_u128(1)),
        customer_uuid: TEST_CALLER.customer_uuid(),
        items: Vec::new(),
        version: 1,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        expires_at: Timestamp::MAX,
    }
}

pub(crate) fn make_order(uuid: OrderUuid, status: OrderStatus) -> OrderDetails {
    OrderDetails {
        order: Order {
            uuid,
            business_uuid: TEST_BUSINESS_UUID,
            stall_uuid: StallUuid::from_uuid(Uuid::from_u128(2)),
            customer_uuid: TEST_CALLER.customer_uuid(),
            status,
            scheduled_for: Timestamp::UNIX_EPOCH,
            subtotal: 1700,
            delivery_fee: 0,
            tax: 0,
            total: 1700,
            currency: "USD".to_string(),
            delivery_option: DeliveryOption::Pickup,
            delivery_address: None,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            notes: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            status_history: Vec::new(),
        },
        items: Vec::new(),
        reschedules: Vec::new(),
        stall_name: Some("Dumpling House".to_string()),
        business_name: Some("Night Market Co".to_string()),
    }
}

pub(crate) fn test_product() -> ProductUuid {
    ProductUuid::from_uuid(Uuid::from_u128(3))
}

pub(crate) fn test_stall() -> StallUuid {
    StallUuid::from_uuid(Uuid::from_u128(2))
}
