//! Server API seams

pub mod http;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AddItem, Cart, LineKey, NewOrder, OrderDetail, OrderStatus, OrderSummary, OrderUpdate,
    RemoveItem, Reschedule,
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not reach its backing store, or could not be reached.
    #[error("service temporarily unavailable")]
    Unavailable,

    /// The server refused the request.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("request failed")]
    Transport(#[source] reqwest::Error),

    #[error("invalid response body")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Whether the request may succeed unchanged later.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable => true,
            Self::Transport(error) => error.is_connect() || error.is_timeout(),
            Self::Rejected { .. } | Self::Decode(_) => false,
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Unavailable | Self::Transport(_) => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }
}

/// Cart endpoints. Every mutation answers with the authoritative cart.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn get_cart(&self) -> Result<Cart, ApiError>;

    async fn add_item(&self, item: &AddItem) -> Result<Cart, ApiError>;

    /// A quantity of zero or less removes the line.
    async fn update_quantity(&self, key: &LineKey, quantity: i64) -> Result<Cart, ApiError>;

    async fn remove_item(&self, selector: &RemoveItem) -> Result<Cart, ApiError>;

    async fn clear(&self) -> Result<Cart, ApiError>;
}

/// Order endpoints.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn place_order(&self, order: &NewOrder) -> Result<OrderDetail, ApiError>;

    async fn get_order(&self, order: Uuid) -> Result<OrderDetail, ApiError>;

    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<OrderSummary>, ApiError>;

    async fn update_order(&self, order: Uuid, update: &OrderUpdate) -> Result<OrderDetail, ApiError>;

    async fn cancel_order(&self, order: Uuid, reason: Option<String>) -> Result<OrderDetail, ApiError>;

    async fn reschedule_order(
        &self,
        order: Uuid,
        reschedule: &Reschedule,
    ) -> Result<OrderDetail, ApiError>;
}
