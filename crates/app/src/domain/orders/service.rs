//! Orders service.
//!
//! Placement turns a cart (or an explicit item list) into a priced order.
//! The store has no transactions, so a pending checkout record is written
//! first, then the items, then the order row: an order is only visible once
//! every item is durable, and the cart is only touched after that. The
//! pending checkout lets a retry finish taking the lines out of the cart
//! instead of placing a second order from the same cart state.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::{
    auth::{Caller, CustomerUuid},
    clock::Clock,
    domain::{
        carts::{CartsService, models::Cart},
        catalog::{
            CatalogError, CatalogService,
            models::{Business, BusinessUuid, Product, Stall, StallUuid},
        },
        orders::{
            Actor, OrderPolicy, OrderStatus, OrdersServiceError,
            data::{NewOrder, NewOrderItem, OrderFilter, PlacedOrder, RescheduleRequest, StatusUpdate},
            models::{
                CartVersion, DeliveryOption, Order, OrderDetails, OrderItem, OrderItemUuid,
                OrderSummary, OrderUuid, PaymentStatus, PendingCheckout, Reschedule,
                RescheduleUuid, StatusHistoryEntry,
            },
            repository::OrdersRepository,
        },
    },
    store::{RowStore, StoreError},
};

/// An order line checked against the catalog.
#[derive(Debug)]
struct ResolvedLine {
    item: NewOrderItem,
    product: Product,
    stall: Stall,
    business: Business,
}

/// What a customer's cart is ready for once interrupted checkouts are finished.
#[derive(Debug)]
enum CartCheckout {
    /// The cart as it stands was already ordered.
    Placed(Order),
    Open(Cart),
}

fn unavailable(product: &NewOrderItem, reason: &'static str) -> OrdersServiceError {
    OrdersServiceError::ItemUnavailable {
        product: product.product_uuid,
        reason,
    }
}

/// Treat a missing catalog entry as `None`.
fn optional<T>(result: Result<T, CatalogError>) -> Result<Option<T>, OrdersServiceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::NotFound) => Ok(None),
        Err(CatalogError::Store(error)) => Err(OrdersServiceError::Unavailable(error)),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub struct StoreOrdersService {
    store: Arc<dyn RowStore>,
    catalog: Arc<dyn CatalogService>,
    carts: Arc<dyn CartsService>,
    clock: Arc<dyn Clock>,
    policy: OrderPolicy,
    repository: OrdersRepository,
}

impl std::fmt::Debug for StoreOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOrdersService")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(
        store: Arc<dyn RowStore>,
        catalog: Arc<dyn CatalogService>,
        carts: Arc<dyn CartsService>,
        clock: Arc<dyn Clock>,
        policy: OrderPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            carts,
            clock,
            policy,
            repository: OrdersRepository::new(),
        }
    }

    async fn load_order(&self, uuid: OrderUuid) -> Result<Order, OrdersServiceError> {
        self.repository
            .find_order(self.store.as_ref(), uuid)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn details(&self, order: Order) -> Result<OrderDetails, OrdersServiceError> {
        let store = self.store.as_ref();

        let items = self.repository.items_for(store, order.uuid).await?;
        let reschedules = self.repository.reschedules_for(store, order.uuid).await?;

        let stall_name = optional(self.catalog.get_stall(order.stall_uuid).await)?
            .map(|stall| stall.name);
        let business_name = optional(self.catalog.get_business(order.business_uuid).await)?
            .map(|business| business.name);

        Ok(OrderDetails {
            order,
            items,
            reschedules,
            stall_name,
            business_name,
        })
    }

    /// Check every line against the catalog, failing on the first one that
    /// cannot be ordered.
    async fn resolve_lines(
        &self,
        items: Vec<NewOrderItem>,
    ) -> Result<Vec<ResolvedLine>, OrdersServiceError> {
        let mut stalls: FxHashMap<StallUuid, Option<Stall>> = FxHashMap::default();
        let mut businesses: FxHashMap<BusinessUuid, Option<Business>> = FxHashMap::default();
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            let product = optional(self.catalog.get_product(item.product_uuid).await)?
                .ok_or_else(|| unavailable(&item, "product not found"))?;

            if !product.active {
                return Err(unavailable(&item, "product is no longer available"));
            }

            if product.stall_uuid != item.stall_uuid {
                return Err(unavailable(&item, "product is not sold by this stall"));
            }

            let stall = match stalls.get(&item.stall_uuid) {
                Some(stall) => stall.clone(),
                None => {
                    let stall = optional(self.catalog.get_stall(item.stall_uuid).await)?;
                    stalls.insert(item.stall_uuid, stall.clone());
                    stall
                }
            }
            .ok_or_else(|| unavailable(&item, "stall not found"))?;

            if !stall.active {
                return Err(unavailable(&item, "stall is closed"));
            }

            let business = match businesses.get(&stall.business_uuid) {
                Some(business) => business.clone(),
                None => {
                    let business =
                        optional(self.catalog.get_business(stall.business_uuid).await)?;
                    businesses.insert(stall.business_uuid, business.clone());
                    business
                }
            }
            .ok_or_else(|| unavailable(&item, "business not found"))?;

            if !business.active {
                return Err(unavailable(&item, "business is closed"));
            }

            lines.push(ResolvedLine {
                item,
                product,
                stall,
                business,
            });
        }

        Ok(lines)
    }

    fn delivery_address(&self, order: &NewOrder) -> Result<Option<String>, OrdersServiceError> {
        let address = trimmed(order.delivery_address.clone());

        if order.delivery_option == DeliveryOption::Delivery
            && address
                .as_ref()
                .is_none_or(|address| address.chars().count() < self.policy.min_address_len)
        {
            return Err(OrdersServiceError::MissingAddress);
        }

        Ok(address)
    }

    /// Write items, then the order row, then read the order back.
    async fn persist(&self, order: &Order, items: &[OrderItem]) -> Result<(), OrdersServiceError> {
        let store = self.store.as_ref();

        for (written, item) in items.iter().enumerate() {
            if let Err(error) = self.repository.save_item(store, item).await {
                self.discard_items(items.get(..written).unwrap_or_default())
                    .await;

                return Err(error.into());
            }
        }

        if let Err(error) = self.repository.save_order(store, order).await {
            self.discard_items(items).await;

            return Err(error.into());
        }

        if self.repository.find_order(store, order.uuid).await?.is_none() {
            return Err(StoreError::Unavailable("order not readable after write".to_string()).into());
        }

        Ok(())
    }

    async fn discard_items(&self, items: &[OrderItem]) {
        for item in items {
            if let Err(error) = self
                .repository
                .delete_item(self.store.as_ref(), item)
                .await
            {
                warn!(
                    order = %item.order_uuid,
                    item = %item.uuid,
                    error = %error,
                    "failed to discard item of unplaced order"
                );
            }
        }
    }

    async fn save(&self, order: &Order) -> Result<(), OrdersServiceError> {
        Ok(self
            .repository
            .save_order(self.store.as_ref(), order)
            .await?)
    }

    /// Take the checkout's lines out of the cart, then forget the checkout.
    async fn complete_checkout(&self, checkout: &PendingCheckout) -> Result<(), OrdersServiceError> {
        self.carts
            .remove_lines(checkout.customer_uuid, &checkout.lines)
            .await?;

        if let Err(error) = self
            .repository
            .delete_checkout(self.store.as_ref(), checkout)
            .await
        {
            warn!(
                order = %checkout.order_uuid,
                error = %error,
                "cart lines removed but the pending checkout was not deleted"
            );
        }

        Ok(())
    }

    /// Finish the checkout of an order that already exists, if one is pending.
    async fn finish_checkout(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<(), OrdersServiceError> {
        let pending = self
            .repository
            .find_checkout(self.store.as_ref(), customer, order)
            .await?;

        if let Some(checkout) = pending {
            info!(order = %order, "finishing interrupted checkout");

            self.complete_checkout(&checkout).await?;
        }

        Ok(())
    }

    /// Finish every interrupted checkout of the cart's owner.
    ///
    /// An order placed from exactly this cart state is handed back instead of
    /// placing it again. Otherwise the cart is returned as it stands once the
    /// lines of earlier orders are gone.
    async fn settle_checkouts(&self, cart: Cart) -> Result<CartCheckout, OrdersServiceError> {
        let store = self.store.as_ref();
        let source = CartVersion {
            uuid: cart.uuid,
            version: cart.version,
        };

        let mut placed = None;
        let mut completed = false;

        for checkout in self
            .repository
            .pending_checkouts(store, cart.customer_uuid)
            .await?
        {
            let Some(order) = self.repository.find_order(store, checkout.order_uuid).await? else {
                self.repository.delete_checkout(store, &checkout).await?;
                continue;
            };

            info!(
                order = %order.uuid,
                cart = %cart.uuid,
                "finishing interrupted checkout"
            );

            self.complete_checkout(&checkout).await?;
            completed = true;

            if checkout.source_cart == Some(source) {
                placed = Some(order);
            }
        }

        if let Some(order) = placed {
            return Ok(CartCheckout::Placed(order));
        }

        if completed {
            return Ok(CartCheckout::Open(
                self.carts.get_cart(cart.customer_uuid).await?,
            ));
        }

        Ok(CartCheckout::Open(cart))
    }

    /// Drop the pending checkout of an order that was never written.
    async fn abandon_checkout(&self, checkout: &PendingCheckout) {
        let store = self.store.as_ref();

        match self.repository.find_order(store, checkout.order_uuid).await {
            Ok(None) => {
                if let Err(error) = self.repository.delete_checkout(store, checkout).await {
                    warn!(
                        order = %checkout.order_uuid,
                        error = %error,
                        "failed to discard pending checkout of unplaced order"
                    );
                }
            }
            Ok(Some(_)) | Err(_) => {}
        }
    }
}

/// Apply a lifecycle transition. Returns `false` when the order already has
/// the requested status.
fn transition(
    order: &mut Order,
    to: OrderStatus,
    actor: Actor,
    notes: Option<String>,
    now: Timestamp,
) -> Result<bool, OrdersServiceError> {
    if order.status == to {
        return Ok(false);
    }

    if !order.status.can_transition(to, actor) {
        return Err(OrdersServiceError::InvalidTransition {
            from: order.status,
            to,
        });
    }

    order.status = to;
    order.updated_at = now;
    order.status_history.push(StatusHistoryEntry {
        status: to,
        at: now,
        notes: trimmed(notes),
    });

    Ok(true)
}

fn authorize(caller: &Caller, order: &Order) -> Result<Actor, OrdersServiceError> {
    order.actor_for(caller).ok_or(OrdersServiceError::Forbidden)
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    async fn place_order(
        &self,
        caller: &Caller,
        new_order: NewOrder,
    ) -> Result<PlacedOrder, OrdersServiceError> {
        let customer = caller.customer_uuid();

        if let Some(uuid) = new_order.uuid
            && let Some(existing) = self
                .repository
                .find_order(self.store.as_ref(), uuid)
                .await?
        {
            if existing.customer_uuid != customer {
                return Err(OrdersServiceError::Conflict);
            }

            info!(order = %uuid, "order already placed, returning it");

            self.finish_checkout(customer, uuid).await?;

            return Ok(PlacedOrder {
                details: self.details(existing).await?,
                created: false,
            });
        }

        let cart = if new_order.items.is_none() {
            let cart = self.carts.get_cart(customer).await?;

            match self.settle_checkouts(cart).await? {
                CartCheckout::Placed(existing) => {
                    return Ok(PlacedOrder {
                        details: self.details(existing).await?,
                        created: false,
                    });
                }
                CartCheckout::Open(cart) => Some(cart),
            }
        } else {
            None
        };

        let items = match (new_order.items.clone(), &cart) {
            (Some(items), _) => items,
            (None, None) => Vec::new(),
            (None, Some(cart)) => cart
                .items
                .iter()
                .cloned()
                .map(|line| NewOrderItem {
                    product_uuid: line.product_uuid,
                    stall_uuid: line.stall_uuid,
                    quantity: line.quantity,
                    scheduled_for: line.scheduled_for,
                    notes: line.special_instructions,
                })
                .collect(),
        };

        if items.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let lines = self.resolve_lines(items).await?;
        let now = self.clock.now();

        if new_order.scheduled_for <= now {
            return Err(OrdersServiceError::InvalidSchedule);
        }

        let delivery_address = self.delivery_address(&new_order)?;

        if lines.iter().any(|line| line.item.quantity == 0) {
            return Err(OrdersServiceError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let Some(first) = lines.first() else {
            return Err(OrdersServiceError::EmptyCart);
        };

        if lines.iter().any(|line| line.stall.uuid != first.stall.uuid) {
            return Err(OrdersServiceError::Validation(
                "all items must come from the same stall".to_string(),
            ));
        }

        let order_uuid = new_order.uuid.unwrap_or_default();

        let items = lines
            .iter()
            .map(|line| {
                Ok(OrderItem {
                    uuid: OrderItemUuid::new(),
                    order_uuid,
                    product_uuid: line.product.uuid,
                    name: line.product.name.clone(),
                    quantity: line.item.quantity,
                    unit_price: line.product.price,
                    total_price: OrderPolicy::line_total(line.product.price, line.item.quantity)?,
                    notes: trimmed(line.item.notes.clone()),
                })
            })
            .collect::<Result<Vec<_>, OrdersServiceError>>()?;

        let totals = self.policy.totals(
            items.iter().map(|item| item.total_price),
            new_order.delivery_option,
        )?;

        let order = Order {
            uuid: order_uuid,
            business_uuid: first.business.uuid,
            stall_uuid: first.stall.uuid,
            customer_uuid: customer,
            status: OrderStatus::Pending,
            scheduled_for: new_order.scheduled_for,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            tax: totals.tax,
            total: totals.total,
            currency: self.policy.currency.clone(),
            delivery_option: new_order.delivery_option,
            delivery_address,
            payment_method: new_order.payment_method,
            payment_status: PaymentStatus::Pending,
            notes: trimmed(new_order.special_instructions),
            created_at: now,
            updated_at: now,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                at: now,
                notes: None,
            }],
        };

        let checkout = PendingCheckout {
            order_uuid,
            customer_uuid: customer,
            source_cart: cart.as_ref().map(|cart| CartVersion {
                uuid: cart.uuid,
                version: cart.version,
            }),
            lines: lines.iter().map(|line| line.item.cart_key()).collect(),
        };

        self.repository
            .save_checkout(self.store.as_ref(), &checkout)
            .await?;

        if let Err(error) = self.persist(&order, &items).await {
            self.abandon_checkout(&checkout).await;

            return Err(error);
        }

        if let Err(error) = self.complete_checkout(&checkout).await {
            warn!(
                order = %order.uuid,
                customer = %customer,
                error = %error,
                "order placed but its cart lines are still pending removal"
            );

            return Err(error);
        }

        info!(
            order = %order.uuid,
            customer = %customer,
            stall = %order.stall_uuid,
            total = order.total,
            "placed order"
        );

        Ok(PlacedOrder {
            details: OrderDetails {
                stall_name: Some(first.stall.name.clone()),
                business_name: Some(first.business.name.clone()),
                order,
                items,
                reschedules: Vec::new(),
            },
            created: true,
        })
    }

    async fn get_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let order = self.load_order(uuid).await?;

        authorize(caller, &order)?;

        self.details(order).await
    }

    async fn list_orders(
        &self,
        caller: &Caller,
        filter: OrderFilter,
    ) -> Result<Vec<OrderSummary>, OrdersServiceError> {
        let store = self.store.as_ref();

        let mut orders: Vec<Order> = self
            .repository
            .all_orders(store)
            .await?
            .into_iter()
            .filter(|order| order.actor_for(caller).is_some())
            .filter(|order| filter.status.is_none_or(|status| order.status == status))
            .collect();

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.uuid.cmp(&a.uuid))
        });

        let mut stall_names: FxHashMap<StallUuid, Option<String>> = FxHashMap::default();
        let mut business_names: FxHashMap<BusinessUuid, Option<String>> = FxHashMap::default();
        let mut summaries = Vec::with_capacity(orders.len());

        for order in orders {
            let item_count = self
                .repository
                .items_for(store, order.uuid)
                .await?
                .iter()
                .map(|item| u64::from(item.quantity))
                .sum();

            let stall_name = match stall_names.get(&order.stall_uuid) {
                Some(name) => name.clone(),
                None => {
                    let name = optional(self.catalog.get_stall(order.stall_uuid).await)?
                        .map(|stall| stall.name);
                    stall_names.insert(order.stall_uuid, name.clone());
                    name
                }
            };

            let business_name = match business_names.get(&order.business_uuid) {
                Some(name) => name.clone(),
                None => {
                    let name = optional(self.catalog.get_business(order.business_uuid).await)?
                        .map(|business| business.name);
                    business_names.insert(order.business_uuid, name.clone());
                    name
                }
            };

            summaries.push(OrderSummary {
                order,
                item_count,
                stall_name,
                business_name,
            });
        }

        Ok(summaries)
    }

    async fn update_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderDetails, OrdersServiceError> {
        if update.status.is_none() && update.payment_status.is_none() {
            return Err(OrdersServiceError::Validation(
                "nothing to update".to_string(),
            ));
        }

        let mut order = self.load_order(uuid).await?;

        if authorize(caller, &order)? != Actor::StallStaff {
            return Err(OrdersServiceError::Forbidden);
        }

        let now = self.clock.now();
        let from = order.status;
        let mut changed = false;

        if let Some(to) = update.status {
            changed |= transition(&mut order, to, Actor::StallStaff, update.notes, now)?;
        }

        if let Some(payment_status) = update.payment_status
            && order.payment_status != payment_status
        {
            order.payment_status = payment_status;
            order.updated_at = now;
            changed = true;
        }

        if changed {
            self.save(&order).await?;

            info!(
                order = %order.uuid,
                from = %from,
                to = %order.status,
                payment_status = %order.payment_status,
                "updated order"
            );
        }

        self.details(order).await
    }

    async fn cancel_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        notes: Option<String>,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut order = self.load_order(uuid).await?;
        let actor = authorize(caller, &order)?;

        if transition(
            &mut order,
            OrderStatus::Cancelled,
            actor,
            notes,
            self.clock.now(),
        )? {
            self.save(&order).await?;

            info!(order = %order.uuid, actor = ?actor, "cancelled order");
        }

        self.details(order).await
    }

    async fn reschedule_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        request: RescheduleRequest,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut order = self.load_order(uuid).await?;

        authorize(caller, &order)?;

        if !order.status.is_reschedulable() {
            return Err(OrdersServiceError::NotReschedulable {
                status: order.status,
            });
        }

        let now = self.clock.now();

        if request.scheduled_for <= now {
            return Err(OrdersServiceError::InvalidSchedule);
        }

        let reschedule = Reschedule {
            uuid: RescheduleUuid::new(),
            order_uuid: order.uuid,
            previous_scheduled_for: order.scheduled_for,
            scheduled_for: request.scheduled_for,
            reason: trimmed(request.reason),
            actor_uuid: caller.uuid,
            created_at: now,
        };

        let store = self.store.as_ref();

        self.repository.save_reschedule(store, &reschedule).await?;

        order.scheduled_for = request.scheduled_for;
        order.updated_at = now;

        if let Err(error) = self.save(&order).await {
            if let Err(cleanup) = self.repository.delete_reschedule(store, &reschedule).await {
                warn!(
                    order = %order.uuid,
                    reschedule = %reschedule.uuid,
                    error = %cleanup,
                    "failed to discard reschedule record of unsaved order"
                );
            }

            return Err(error);
        }

        info!(
            order = %order.uuid,
            from = %reschedule.previous_scheduled_for,
            to = %reschedule.scheduled_for,
            "rescheduled order"
        );

        self.details(order).await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the caller's cart, or an explicit item list, into an order.
    async fn place_order(
        &self,
        caller: &Caller,
        order: NewOrder,
    ) -> Result<PlacedOrder, OrdersServiceError>;

    /// Retrieve a single order the caller may see.
    async fn get_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Orders visible to the caller, newest first.
    async fn list_orders(
        &self,
        caller: &Caller,
        filter: OrderFilter,
    ) -> Result<Vec<OrderSummary>, OrdersServiceError>;

    /// Staff-only status and payment updates.
    async fn update_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Cancel an order as whichever actor the caller is.
    async fn cancel_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        notes: Option<String>,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Move the promised time of a pending or confirmed order.
    async fn reschedule_order(
        &self,
        caller: &Caller,
        uuid: OrderUuid,
        request: RescheduleRequest,
    ) -> Result<OrderDetails, OrdersServiceError>;
}
