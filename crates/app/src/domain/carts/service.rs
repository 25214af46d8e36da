//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    auth::CustomerUuid,
    clock::Clock,
    domain::{
        carts::{
            data::NewCartItem,
            errors::CartsServiceError,
            models::{
                Cart, CartItem, CartItemKey, CartItemSelector, CartSummary, CartUuid,
                CartValidation, UnavailableItem, UnavailableReason,
            },
            repository::CartsRepository,
        },
        catalog::{
            CatalogError, CatalogService,
            models::{Stall, StallUuid},
        },
    },
    store::RowStore,
};

/// Tunables for cart lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartPolicy {
    /// How long a cart lives after its last mutation.
    pub ttl: SignedDuration,
}

impl Default for CartPolicy {
    fn default() -> Self {
        Self {
            ttl: SignedDuration::from_hours(24 * 7),
        }
    }
}

pub struct StoreCartsService {
    store: Arc<dyn RowStore>,
    catalog: Arc<dyn CatalogService>,
    clock: Arc<dyn Clock>,
    policy: CartPolicy,
    repository: CartsRepository,
}

impl std::fmt::Debug for StoreCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCartsService")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StoreCartsService {
    #[must_use]
    pub fn new(
        store: Arc<dyn RowStore>,
        catalog: Arc<dyn CatalogService>,
        clock: Arc<dyn Clock>,
        policy: CartPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            policy,
            repository: CartsRepository::new(),
        }
    }

    fn expiry_from(&self, now: Timestamp) -> Timestamp {
        now.checked_add(self.policy.ttl).unwrap_or(Timestamp::MAX)
    }

    /// Load the live cart for `customer`, dropping an expired one.
    ///
    /// The returned cart may not be persisted yet.
    async fn load(&self, customer: CustomerUuid) -> Result<(Cart, bool), CartsServiceError> {
        let now = self.clock.now();
        let store = self.store.as_ref();

        match self.repository.find_cart(store, customer).await? {
            Some(cart) if !cart.is_expired(now) => Ok((cart, true)),
            Some(expired) => {
                debug!(
                    customer = %customer,
                    cart = %expired.uuid,
                    expires_at = %expired.expires_at,
                    "evicting expired cart"
                );

                self.repository.delete_cart(store, customer).await?;

                Ok((self.fresh_cart(customer, now), false))
            }
            None => Ok((self.fresh_cart(customer, now), false)),
        }
    }

    fn fresh_cart(&self, customer: CustomerUuid, now: Timestamp) -> Cart {
        Cart {
            uuid: CartUuid::new(),
            customer_uuid: customer,
            items: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
            expires_at: self.expiry_from(now),
        }
    }

    /// Stamp a mutation onto `cart` and persist it.
    async fn commit(&self, mut cart: Cart) -> Result<Cart, CartsServiceError> {
        let now = self.clock.now();

        cart.version = cart.version.saturating_add(1);
        cart.updated_at = now;
        cart.expires_at = self.expiry_from(now);

        self.repository
            .save_cart(self.store.as_ref(), &cart)
            .await?;

        Ok(cart)
    }

    async fn stall_for(
        &self,
        stalls: &mut FxHashMap<StallUuid, Option<Stall>>,
        item: &CartItem,
    ) -> Result<Option<Stall>, CartsServiceError> {
        if let Some(stall) = stalls.get(&item.stall_uuid) {
            return Ok(stall.clone());
        }

        let stall = match self.catalog.get_stall(item.stall_uuid).await {
            Ok(stall) => Some(stall),
            Err(CatalogError::NotFound) => None,
            Err(CatalogError::Store(error)) => return Err(CartsServiceError::Unavailable(error)),
        };

        stalls.insert(item.stall_uuid, stall.clone());

        Ok(stall)
    }

    async fn check_item(
        &self,
        stalls: &mut FxHashMap<StallUuid, Option<Stall>>,
        item: &CartItem,
    ) -> Result<Option<UnavailableReason>, CartsServiceError> {
        let product = match self.catalog.get_product(item.product_uuid).await {
            Ok(product) => product,
            Err(CatalogError::NotFound) => return Ok(Some(UnavailableReason::ProductNotFound)),
            Err(CatalogError::Store(error)) => return Err(CartsServiceError::Unavailable(error)),
        };

        if !product.active {
            return Ok(Some(UnavailableReason::ProductInactive));
        }

        if product.stall_uuid != item.stall_uuid {
            return Ok(Some(UnavailableReason::StallMismatch));
        }

        Ok(match self.stall_for(stalls, item).await? {
            None => Some(UnavailableReason::StallNotFound),
            Some(stall) if !stall.active => Some(UnavailableReason::StallInactive),
            Some(_) => None,
        })
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    async fn get_cart(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError> {
        let (cart, persisted) = self.load(customer).await?;

        if !persisted {
            self.repository
                .save_cart(self.store.as_ref(), &cart)
                .await?;
        }

        Ok(cart)
    }

    async fn validate_cart(&self, cart: &Cart) -> Result<CartValidation, CartsServiceError> {
        let mut stalls = FxHashMap::default();
        let mut unavailable = Vec::new();

        for item in &cart.items {
            if let Some(reason) = self.check_item(&mut stalls, item).await? {
                unavailable.push(UnavailableItem {
                    product_uuid: item.product_uuid,
                    stall_uuid: item.stall_uuid,
                    reason,
                });
            }
        }

        Ok(CartValidation {
            valid: unavailable.is_empty(),
            unavailable,
        })
    }

    async fn add_item(
        &self,
        customer: CustomerUuid,
        item: NewCartItem,
    ) -> Result<CartSummary, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let unit_price = match item.unit_price {
            Some(price) => price,
            None => self.catalog.get_product(item.product_uuid).await?.price,
        };

        let (mut cart, _) = self.load(customer).await?;

        let line = CartItem {
            product_uuid: item.product_uuid,
            stall_uuid: item.stall_uuid,
            quantity: item.quantity,
            unit_price,
            scheduled_for: item.scheduled_for,
            special_instructions: item.special_instructions,
        };

        match cart.position(&line.key()) {
            Some(index) => {
                let Some(existing) = cart.items.get_mut(index) else {
                    return Err(CartsServiceError::ItemNotFound);
                };

                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| CartsServiceError::Validation("quantity too large".to_string()))?;
                existing.unit_price = line.unit_price;

                if line.special_instructions.is_some() {
                    existing.special_instructions = line.special_instructions;
                }
            }
            None => cart.items.push(line),
        }

        let cart = self.commit(cart).await?;

        debug!(customer = %customer, version = cart.version, "added cart item");

        Ok(cart.into())
    }

    async fn update_quantity(
        &self,
        customer: CustomerUuid,
        key: CartItemKey,
        quantity: i64,
    ) -> Result<CartSummary, CartsServiceError> {
        let (mut cart, _) = self.load(customer).await?;

        if quantity <= 0 {
            cart.items.retain(|item| item.key() != key);

            return Ok(self.commit(cart).await?.into());
        }

        let quantity = u32::try_from(quantity)
            .map_err(|_overflow| CartsServiceError::Validation("quantity too large".to_string()))?;

        let item = cart
            .position(&key)
            .and_then(|index| cart.items.get_mut(index))
            .ok_or(CartsServiceError::ItemNotFound)?;

        item.quantity = quantity;

        Ok(self.commit(cart).await?.into())
    }

    async fn remove_item(
        &self,
        customer: CustomerUuid,
        selector: CartItemSelector,
    ) -> Result<Cart, CartsServiceError> {
        let (mut cart, _) = self.load(customer).await?;

        cart.items.retain(|item| !selector.matches(item));

        self.commit(cart).await
    }

    async fn clear(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError> {
        let (mut cart, _) = self.load(customer).await?;

        cart.items.clear();

        self.commit(cart).await
    }

    async fn remove_lines(
        &self,
        customer: CustomerUuid,
        keys: &[CartItemKey],
    ) -> Result<Cart, CartsServiceError> {
        let (mut cart, persisted) = self.load(customer).await?;
        let before = cart.items.len();

        cart.items.retain(|item| !keys.contains(&item.key()));

        if persisted && cart.items.len() == before {
            return Ok(cart);
        }

        self.commit(cart).await
    }

    async fn evict_expired_carts(&self) -> Result<usize, CartsServiceError> {
        let now = self.clock.now();
        let store = self.store.as_ref();
        let mut evicted = 0;

        for cart in self.repository.all_carts(store).await? {
            if cart.is_expired(now) && self.repository.delete_cart(store, cart.customer_uuid).await? {
                evicted += 1;
            }
        }

        debug!(evicted, "evicted expired carts");

        Ok(evicted)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the customer's cart, creating an empty one if none is live.
    async fn get_cart(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError>;

    /// Check every line of `cart` against current reference data.
    async fn validate_cart(&self, cart: &Cart) -> Result<CartValidation, CartsServiceError>;

    /// Add an item, merging into an existing line with the same key.
    async fn add_item(
        &self,
        customer: CustomerUuid,
        item: NewCartItem,
    ) -> Result<CartSummary, CartsServiceError>;

    /// Set the quantity of one line. Zero or less removes it.
    async fn update_quantity(
        &self,
        customer: CustomerUuid,
        key: CartItemKey,
        quantity: i64,
    ) -> Result<CartSummary, CartsServiceError>;

    /// Remove every line matching `selector`.
    async fn remove_item(
        &self,
        customer: CustomerUuid,
        selector: CartItemSelector,
    ) -> Result<Cart, CartsServiceError>;

    /// Empty the cart.
    async fn clear(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError>;

    /// Remove the lines consumed by an order.
    async fn remove_lines(
        &self,
        customer: CustomerUuid,
        keys: &[CartItemKey],
    ) -> Result<Cart, CartsServiceError>;

    /// Delete every expired cart, returning how many were removed.
    async fn evict_expired_carts(&self) -> Result<usize, CartsServiceError>;
}
