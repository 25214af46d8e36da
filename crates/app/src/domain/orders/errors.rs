//! Orders service errors.

use thiserror::Error;

use crate::{
    domain::{
        carts::CartsServiceError, catalog::models::ProductUuid, orders::status::OrderStatus,
    },
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product {product} is unavailable: {reason}")]
    ItemUnavailable {
        product: ProductUuid,
        reason: &'static str,
    },

    #[error("scheduled time must be in the future")]
    InvalidSchedule,

    #[error("a delivery address is required for delivery orders")]
    MissingAddress,

    #[error("{0}")]
    Validation(String),

    #[error("order not found")]
    NotFound,

    #[error("not allowed to act on this order")]
    Forbidden,

    #[error("order already exists")]
    Conflict,

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order cannot be rescheduled while {status}, only while pending or confirmed")]
    NotReschedulable { status: OrderStatus },

    #[error("order storage unavailable")]
    Unavailable(#[source] StoreError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        Self::Unavailable(error)
    }
}

impl From<CartsServiceError> for OrdersServiceError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::Unavailable(source) => Self::Unavailable(source),
            CartsServiceError::Validation(message) => Self::Validation(message),
            CartsServiceError::ItemNotFound => Self::Validation("cart item not found".to_string()),
        }
    }
}
