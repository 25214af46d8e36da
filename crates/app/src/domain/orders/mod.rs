//! Orders

pub mod data;
pub mod errors;
pub mod models;
mod pricing;
mod repository;
pub mod service;
pub mod status;

pub use errors::OrdersServiceError;
pub use pricing::{OrderPolicy, OrderTotals};
pub use service::*;
pub use status::{Actor, OrderStatus};
