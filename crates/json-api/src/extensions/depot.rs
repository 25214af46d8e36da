//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use stallhub_app::auth::Caller;

const CALLER_KEY: &str = "stallhub.caller";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Store the authenticated caller for downstream handlers.
    fn insert_caller(&mut self, caller: Caller);

    fn caller_or_401(&self) -> Result<Caller, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_caller(&mut self, caller: Caller) {
        self.insert(CALLER_KEY, caller);
    }

    fn caller_or_401(&self) -> Result<Caller, StatusError> {
        self.get::<Caller>(CALLER_KEY)
            .cloned()
            .map_err(|_ignored| StatusError::unauthorized())
    }
}
