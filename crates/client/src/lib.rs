//! Stallhub client
//!
//! A local, persisted mirror of the customer's cart that applies changes
//! optimistically and then adopts whatever the server answers, plus polling
//! helpers that keep carts and orders converging on server state.

pub mod api;
pub mod mirror;
pub mod models;
pub mod refresh;
pub mod storage;
pub mod tracker;

pub use api::{ApiError, CartApi, OrdersApi, http::HttpApi};
pub use mirror::{CartMirror, MirrorError, MutationOutcome};
pub use refresh::{RefreshCoordinator, RefreshHandle, RefreshOutcome, Refreshable};
pub use storage::{FileMirrorStorage, MemoryMirrorStorage, MirrorStorage, StorageError};
pub use tracker::OrderTracker;
