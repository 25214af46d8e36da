//! Errors

use salvo::http::StatusError;
use stallhub_app::domain::carts::CartsServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::Validation(message) => StatusError::bad_request().brief(message),
        CartsServiceError::ItemNotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::Unavailable(source) => {
            error!("cart storage unavailable: {source}");

            StatusError::service_unavailable().brief("Cart storage is unavailable")
        }
    }
}
