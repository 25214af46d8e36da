//! Order status polling

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::{
    api::{ApiError, OrdersApi},
    models::{OrderDetail, OrderStatus},
    refresh::Refreshable,
};

/// Follows one order. Subscribers are notified only when the order changed.
pub struct OrderTracker {
    api: Arc<dyn OrdersApi>,
    order: Uuid,
    label: String,
    latest: watch::Sender<Option<OrderDetail>>,
}

impl std::fmt::Debug for OrderTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderTracker")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl OrderTracker {
    pub fn new(api: Arc<dyn OrdersApi>, order: Uuid) -> Self {
        Self {
            api,
            order,
            label: format!("order {order}"),
            latest: watch::Sender::new(None),
        }
    }

    #[must_use]
    pub const fn order(&self) -> Uuid {
        self.order
    }

    /// Last fetched copy, if any.
    #[must_use]
    pub fn latest(&self) -> Option<OrderDetail> {
        self.latest.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.latest.borrow().as_ref().map(|order| order.status)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<OrderDetail>> {
        self.latest.subscribe()
    }

    /// Record a copy obtained elsewhere, e.g. from a cancel response.
    pub fn observe(&self, order: OrderDetail) {
        if order.uuid != self.order {
            return;
        }

        self.latest.send_if_modified(|latest| {
            if latest.as_ref() == Some(&order) {
                return false;
            }

            if let Some(previous) = latest.as_ref().map(|latest| latest.status)
                && previous != order.status
            {
                info!(order = %order.uuid, from = %previous.as_str(), to = %order.status.as_str(), "order status changed");
            }

            *latest = Some(order);
            true
        });
    }
}

#[async_trait]
impl Refreshable for OrderTracker {
    fn resource(&self) -> &str {
        &self.label
    }

    async fn refresh(&self) -> Result<(), ApiError> {
        let order = self.api.get_order(self.order).await?;

        self.observe(order);

        Ok(())
    }
}
