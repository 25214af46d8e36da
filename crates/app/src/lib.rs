//! Shared application domain and persistence modules.

pub mod auth;
pub mod clock;
pub mod context;
pub mod database;
pub mod domain;
pub mod seed;
pub mod store;
pub mod uuids;

#[cfg(test)]
mod test;
