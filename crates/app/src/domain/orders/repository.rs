//! Orders repository.
//!
//! Items and reschedules are keyed `"{order}/{uuid}"` so a prefix scan
//! returns everything belonging to one order in creation order. Pending
//! checkouts are keyed `"{customer}/{order}"`.

use crate::{
    auth::CustomerUuid,
    domain::orders::models::{Order, OrderItem, OrderUuid, PendingCheckout, Reschedule},
    store::{Collection, RowStore, StoreError, collections},
};

#[derive(Debug)]
pub(crate) struct OrdersRepository {
    orders: Collection<Order>,
    items: Collection<OrderItem>,
    reschedules: Collection<Reschedule>,
    checkouts: Collection<PendingCheckout>,
}

fn child_prefix(order: OrderUuid) -> String {
    format!("{order}/")
}

fn checkout_key(customer: CustomerUuid, order: OrderUuid) -> String {
    format!("{customer}/{order}")
}

impl OrdersRepository {
    pub(crate) const fn new() -> Self {
        Self {
            orders: Collection::new(collections::ORDERS),
            items: Collection::new(collections::ORDER_ITEMS),
            reschedules: Collection::new(collections::ORDER_RESCHEDULES),
            checkouts: Collection::new(collections::CHECKOUTS),
        }
    }

    pub(crate) async fn find_order(
        &self,
        store: &dyn RowStore,
        uuid: OrderUuid,
    ) -> Result<Option<Order>, StoreError> {
        self.orders.get(store, &uuid.to_string()).await
    }

    pub(crate) async fn save_order(
        &self,
        store: &dyn RowStore,
        order: &Order,
    ) -> Result<(), StoreError> {
        self.orders.put(store, &order.uuid.to_string(), order).await
    }

    pub(crate) async fn all_orders(&self, store: &dyn RowStore) -> Result<Vec<Order>, StoreError> {
        self.orders.scan(store, "").await
    }

    pub(crate) async fn save_item(
        &self,
        store: &dyn RowStore,
        item: &OrderItem,
    ) -> Result<(), StoreError> {
        let key = format!("{}{}", child_prefix(item.order_uuid), item.uuid);

        self.items.put(store, &key, item).await
    }

    pub(crate) async fn delete_item(
        &self,
        store: &dyn RowStore,
        item: &OrderItem,
    ) -> Result<bool, StoreError> {
        let key = format!("{}{}", child_prefix(item.order_uuid), item.uuid);

        self.items.delete(store, &key).await
    }

    pub(crate) async fn items_for(
        &self,
        store: &dyn RowStore,
        order: OrderUuid,
    ) -> Result<Vec<OrderItem>, StoreError> {
        self.items.scan(store, &child_prefix(order)).await
    }

    pub(crate) async fn save_reschedule(
        &self,
        store: &dyn RowStore,
        reschedule: &Reschedule,
    ) -> Result<(), StoreError> {
        let key = format!("{}{}", child_prefix(reschedule.order_uuid), reschedule.uuid);

        self.reschedules.put(store, &key, reschedule).await
    }

    pub(crate) async fn delete_reschedule(
        &self,
        store: &dyn RowStore,
        reschedule: &Reschedule,
    ) -> Result<bool, StoreError> {
        let key = format!("{}{}", child_prefix(reschedule.order_uuid), reschedule.uuid);

        self.reschedules.delete(store, &key).await
    }

    pub(crate) async fn reschedules_for(
        &self,
        store: &dyn RowStore,
        order: OrderUuid,
    ) -> Result<Vec<Reschedule>, StoreError> {
        self.reschedules.scan(store, &child_prefix(order)).await
    }

    pub(crate) async fn save_checkout(
        &self,
        store: &dyn RowStore,
        checkout: &PendingCheckout,
    ) -> Result<(), StoreError> {
        let key = checkout_key(checkout.customer_uuid, checkout.order_uuid);

        self.checkouts.put(store, &key, checkout).await
    }

    pub(crate) async fn find_checkout(
        &self,
        store: &dyn RowStore,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Option<PendingCheckout>, StoreError> {
        self.checkouts
            .get(store, &checkout_key(customer, order))
            .await
    }

    pub(crate) async fn pending_checkouts(
        &self,
        store: &dyn RowStore,
        customer: CustomerUuid,
    ) -> Result<Vec<PendingCheckout>, StoreError> {
        self.checkouts.scan(store, &format!("{customer}/")).await
    }

    pub(crate) async fn delete_checkout(
        &self,
        store: &dyn RowStore,
        checkout: &PendingCheckout,
    ) -> Result<bool, StoreError> {
        let key = checkout_key(checkout.customer_uuid, checkout.order_uuid);

        self.checkouts.delete(store, &key).await
    }
}
