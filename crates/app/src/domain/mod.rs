//! Stallhub Domain Concerns

pub mod carts;
pub mod catalog;
pub mod orders;
