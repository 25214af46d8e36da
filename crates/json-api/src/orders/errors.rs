//! Errors

use salvo::http::StatusError;
use stallhub_app::domain::orders::OrdersServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::EmptyCart
        | OrdersServiceError::ItemUnavailable { .. }
        | OrdersServiceError::InvalidSchedule
        | OrdersServiceError::MissingAddress
        | OrdersServiceError::Validation(_) => StatusError::bad_request().brief(error.to_string()),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::Forbidden => {
            StatusError::forbidden().brief("Not allowed to act on this order")
        }
        OrdersServiceError::Conflict
        | OrdersServiceError::InvalidTransition { .. }
        | OrdersServiceError::NotReschedulable { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::Unavailable(source) => {
            error!("order storage unavailable: {source}");

            StatusError::service_unavailable().brief("Order storage is unavailable")
        }
    }
}
