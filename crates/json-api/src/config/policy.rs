//! Cart & Order Policy Config

use clap::Args;
use jiff::SignedDuration;
use stallhub_app::domain::{carts::CartPolicy, orders::OrderPolicy};

/// Cart lifetime settings.
#[derive(Debug, Args)]
pub struct CartsConfig {
    /// Hours a cart lives after its last change
    #[arg(long, env = "CART_TTL_HOURS", default_value_t = 168_i64)]
    pub cart_ttl_hours: i64,
}

impl CartsConfig {
    pub(crate) fn to_policy(&self) -> CartPolicy {
        CartPolicy {
            ttl: SignedDuration::from_hours(self.cart_ttl_hours),
        }
    }
}

/// Order pricing and validation settings.
#[derive(Debug, Args)]
pub struct OrdersConfig {
    /// Flat delivery fee in cents
    #[arg(long, env = "DELIVERY_FEE_CENTS", default_value_t = 500_u64)]
    pub delivery_fee_cents: u64,

    /// Tax rate in basis points, applied to the subtotal
    #[arg(long, env = "TAX_RATE_BPS", default_value_t = 0_u32)]
    pub tax_rate_bps: u32,

    /// ISO 4217 currency code stamped on orders
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Minimum length of a delivery address
    #[arg(long, env = "MIN_DELIVERY_ADDRESS_LEN", default_value_t = 10_usize)]
    pub min_delivery_address_len: usize,
}

impl OrdersConfig {
    pub(crate) fn to_policy(&self) -> OrderPolicy {
        OrderPolicy {
            delivery_fee: self.delivery_fee_cents,
            tax_rate_bps: self.tax_rate_bps,
            currency: self.currency.clone(),
            min_address_len: self.min_delivery_address_len,
        }
    }
}
