//! Client cart mirror
//!
//! Every mutation is applied to the local copy first so the UI updates at
//! once. The server's answer then replaces the local copy wholesale; local
//! and remote changes are never merged field by field. When the server is
//! unreachable the optimistic copy is kept and persisted so nothing is lost.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    api::{ApiError, CartApi},
    models::{AddItem, Cart, LineKey, RemoveItem},
    refresh::Refreshable,
    storage::{MirrorStorage, StorageError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change and the mirror now matches it.
    Synced,

    /// The server was unavailable; the change is kept locally.
    SavedLocally,
}

#[derive(Debug, Error)]
pub enum MirrorError {
    /// The server refused the change. The mirror has been re-synced.
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("failed to load the saved cart")]
    Storage(#[from] StorageError),
}

pub struct CartMirror {
    api: Arc<dyn CartApi>,
    storage: Arc<dyn MirrorStorage>,
    cart: RwLock<Cart>,
}

impl std::fmt::Debug for CartMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartMirror").finish_non_exhaustive()
    }
}

impl CartMirror {
    /// Open the mirror with whatever was last persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved copy cannot be read.
    pub async fn open(
        api: Arc<dyn CartApi>,
        storage: Arc<dyn MirrorStorage>,
    ) -> Result<Self, MirrorError> {
        let cart = storage.load().await?.unwrap_or_default();

        debug!(items = cart.items.len(), "opened cart mirror");

        Ok(Self {
            api,
            storage,
            cart: RwLock::new(cart),
        })
    }

    /// A copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.read().await.clone()
    }

    pub async fn item_count(&self) -> u64 {
        self.cart.read().await.item_count()
    }

    pub async fn total(&self) -> u64 {
        self.cart.read().await.total()
    }

    pub async fn quantity_of(&self, product: Uuid) -> u64 {
        self.cart.read().await.quantity_of(product)
    }

    /// Replace the local copy with the server's cart.
    ///
    /// # Errors
    ///
    /// Returns the API error; the local copy is left untouched.
    pub async fn sync(&self) -> Result<(), ApiError> {
        let cart = self.api.get_cart().await?;

        self.adopt(cart).await;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MirrorError::Rejected`] when the server refuses the item.
    pub async fn add_item(&self, item: AddItem) -> Result<MutationOutcome, MirrorError> {
        self.apply_local(|cart| cart.apply_add(&item)).await;

        let result = self.api.add_item(&item).await;

        self.settle(result).await
    }

    /// A quantity of zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Rejected`] when the server refuses the change.
    pub async fn update_quantity(
        &self,
        key: LineKey,
        quantity: i64,
    ) -> Result<MutationOutcome, MirrorError> {
        self.apply_local(|cart| cart.apply_set_quantity(&key, quantity))
            .await;

        let result = self.api.update_quantity(&key, quantity).await;

        self.settle(result).await
    }

    /// # Errors
    ///
    /// Returns [`MirrorError::Rejected`] when the server refuses the change.
    pub async fn remove_item(&self, selector: RemoveItem) -> Result<MutationOutcome, MirrorError> {
        self.apply_local(|cart| cart.apply_remove(&selector)).await;

        let result = self.api.remove_item(&selector).await;

        self.settle(result).await
    }

    /// # Errors
    ///
    /// Returns [`MirrorError::Rejected`] when the server refuses the change.
    pub async fn clear(&self) -> Result<MutationOutcome, MirrorError> {
        self.apply_local(Cart::apply_clear).await;

        let result = self.api.clear().await;

        self.settle(result).await
    }

    async fn apply_local(&self, change: impl FnOnce(&mut Cart)) {
        let cart = {
            let mut cart = self.cart.write().await;
            change(&mut cart);
            cart.clone()
        };

        self.persist(&cart).await;
    }

    async fn settle(&self, result: Result<Cart, ApiError>) -> Result<MutationOutcome, MirrorError> {
        match result {
            Ok(cart) => {
                self.adopt(cart).await;

                Ok(MutationOutcome::Synced)
            }
            Err(error) if error.is_unavailable() => {
                info!(%error, "cart change saved locally");

                Ok(MutationOutcome::SavedLocally)
            }
            Err(error) => {
                if let Err(sync_error) = self.sync().await {
                    warn!(%sync_error, "failed to re-sync cart after rejected change");
                }

                let status = match &error {
                    ApiError::Rejected { status, .. } => Some(*status),
                    _ => None,
                };

                Err(MirrorError::Rejected {
                    status,
                    message: error.user_message(),
                })
            }
        }
    }

    async fn adopt(&self, cart: Cart) {
        *self.cart.write().await = cart.clone();

        self.persist(&cart).await;
    }

    async fn persist(&self, cart: &Cart) {
        if let Err(error) = self.storage.save(cart).await {
            warn!(%error, "failed to persist cart mirror");
        }
    }
}

#[async_trait]
impl Refreshable for CartMirror {
    fn resource(&self) -> &str {
        "cart"
    }

    async fn refresh(&self) -> Result<(), ApiError> {
        self.sync().await
    }
}
