//! Cart Handlers

pub(crate) mod add;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod update;
