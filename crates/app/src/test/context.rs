//! Test context for service-level tests.
//!
//! Every context gets its own in-memory store, a manual clock and a small
//! catalog: one open business with two stalls, plus a closed business.

use std::sync::Arc;

use jiff::Timestamp;

use crate::{
    auth::{Caller, CallerUuid, Role},
    clock::ManualClock,
    domain::{
        carts::{CartPolicy, StoreCartsService},
        catalog::{
            StoreCatalogService,
            models::{Business, BusinessUuid, Product, ProductUuid, Stall, StallUuid},
            service::CatalogData,
        },
        orders::{OrderPolicy, StoreOrdersService},
    },
    store::InMemoryRowStore,
};

pub(crate) const START: &str = "2026-03-01T12:00:00Z";

pub(crate) struct TestContext {
    pub store: Arc<InMemoryRowStore>,
    pub clock: Arc<ManualClock>,
    pub catalog: Arc<StoreCatalogService>,
    pub carts: Arc<StoreCartsService>,
    pub orders: StoreOrdersService,

    pub business: Business,
    pub stall: Stall,
    pub other_stall: Stall,
    pub closed_stall: Stall,

    /// 850 cents, sold by `stall`.
    pub dumplings: Product,

    /// 1200 cents, sold by `stall`.
    pub noodles: Product,

    /// Inactive, sold by `stall`.
    pub retired: Product,

    /// Sold by `other_stall`.
    pub bao: Product,

    /// Sold by `closed_stall`, whose business is closed.
    pub closed_item: Product,
}

fn product(stall: &Stall, name: &str, price: u64, active: bool) -> Product {
    Product {
        uuid: ProductUuid::new(),
        stall_uuid: stall.uuid,
        name: name.to_string(),
        price,
        active,
    }
}

fn stall(business: &Business, name: &str) -> Stall {
    Stall {
        uuid: StallUuid::new(),
        business_uuid: business.uuid,
        name: name.to_string(),
        active: true,
        capacity_per_day: None,
    }
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_policy(OrderPolicy::default()).await
    }

    pub async fn with_policy(policy: OrderPolicy) -> Self {
        let store = Arc::new(InMemoryRowStore::new());
        let start: Timestamp = START.parse().expect("valid start timestamp");
        let clock = Arc::new(ManualClock::new(start));

        let catalog = Arc::new(StoreCatalogService::new(store.clone()));

        let business = Business {
            uuid: BusinessUuid::new(),
            name: "Night Market Co".to_string(),
            active: true,
        };

        let closed_business = Business {
            uuid: BusinessUuid::new(),
            name: "Shuttered Foods".to_string(),
            active: false,
        };

        let stall_one = stall(&business, "Dumpling House");
        let other_stall = stall(&business, "Bao Corner");
        let closed_stall = stall(&closed_business, "Last Orders");

        let dumplings = product(&stall_one, "Pork Dumplings", 850, true);
        let noodles = product(&stall_one, "Dan Dan Noodles", 1200, true);
        let retired = product(&stall_one, "Seasonal Soup", 700, false);
        let bao = product(&other_stall, "Char Siu Bao", 400, true);
        let closed_item = product(&closed_stall, "Fried Rice", 900, true);

        catalog
            .import(&CatalogData {
                businesses: vec![business.clone(), closed_business],
                stalls: vec![stall_one.clone(), other_stall.clone(), closed_stall.clone()],
                products: vec![
                    dumplings.clone(),
                    noodles.clone(),
                    retired.clone(),
                    bao.clone(),
                    closed_item.clone(),
                ],
            })
            .await
            .expect("Failed to import test catalog");

        let carts = Arc::new(StoreCartsService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            CartPolicy::default(),
        ));

        let orders = StoreOrdersService::new(
            store.clone(),
            catalog.clone(),
            carts.clone(),
            clock.clone(),
            policy,
        );

        Self {
            store,
            clock,
            catalog,
            carts,
            orders,
            business,
            stall: stall_one,
            other_stall,
            closed_stall,
            dumplings,
            noodles,
            retired,
            bao,
            closed_item,
        }
    }

    /// A new customer with no history.
    pub fn customer(&self) -> Caller {
        Caller {
            uuid: CallerUuid::new(),
            role: Role::Customer,
            business_uuid: None,
        }
    }

    /// Staff of the fixture business.
    pub fn staff(&self) -> Caller {
        Caller {
            uuid: CallerUuid::new(),
            role: Role::Staff,
            business_uuid: Some(self.business.uuid),
        }
    }

    /// Staff of some unrelated business.
    pub fn outsider(&self) -> Caller {
        Caller {
            uuid: CallerUuid::new(),
            role: Role::Staff,
            business_uuid: Some(BusinessUuid::new()),
        }
    }

    pub fn admin(&self) -> Caller {
        Caller {
            uuid: CallerUuid::new(),
            role: Role::Admin,
            business_uuid: None,
        }
    }
}
