//! Order pricing.

use crate::domain::orders::{OrdersServiceError, models::DeliveryOption};

const BASIS_POINTS: u128 = 10_000;

/// Pricing and validation knobs for new orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPolicy {
    /// Flat surcharge for delivery orders, in cents.
    pub delivery_fee: u64,

    /// Tax on the subtotal, in basis points.
    pub tax_rate_bps: u32,

    pub currency: String,

    /// Shortest accepted delivery address, after trimming.
    pub min_address_len: usize,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: 500,
            tax_rate_bps: 0,
            currency: "USD".to_string(),
            min_address_len: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub tax: u64,
    pub total: u64,
}

fn too_large() -> OrdersServiceError {
    OrdersServiceError::Validation("order total too large".to_string())
}

impl OrderPolicy {
    /// Total of one line.
    ///
    /// # Errors
    ///
    /// Returns a validation error on overflow.
    pub fn line_total(unit_price: u64, quantity: u32) -> Result<u64, OrdersServiceError> {
        unit_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(too_large)
    }

    /// Tax on `subtotal`, rounded half up to the cent.
    ///
    /// # Errors
    ///
    /// Returns a validation error on overflow.
    pub fn tax_on(&self, subtotal: u64) -> Result<u64, OrdersServiceError> {
        let scaled = u128::from(subtotal)
            .checked_mul(u128::from(self.tax_rate_bps))
            .and_then(|value| value.checked_add(BASIS_POINTS / 2))
            .ok_or_else(too_large)?;

        u64::try_from(scaled / BASIS_POINTS).map_err(|_overflow| too_large())
    }

    /// Price an order from its line totals.
    ///
    /// # Errors
    ///
    /// Returns a validation error on overflow.
    pub fn totals(
        &self,
        line_totals: impl IntoIterator<Item = u64>,
        delivery_option: DeliveryOption,
    ) -> Result<OrderTotals, OrdersServiceError> {
        let subtotal = line_totals
            .into_iter()
            .try_fold(0_u64, u64::checked_add)
            .ok_or_else(too_large)?;

        let delivery_fee = match delivery_option {
            DeliveryOption::Delivery => self.delivery_fee,
            DeliveryOption::Pickup => 0,
        };

        let tax = self.tax_on(subtotal)?;

        let total = subtotal
            .checked_add(delivery_fee)
            .and_then(|value| value.checked_add(tax))
            .ok_or_else(too_large)?;

        Ok(OrderTotals {
            subtotal,
            delivery_fee,
            tax,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn policy(tax_rate_bps: u32) -> OrderPolicy {
        OrderPolicy {
            tax_rate_bps,
            ..OrderPolicy::default()
        }
    }

    #[test]
    fn pickup_has_no_delivery_fee() -> TestResult {
        let totals = policy(0).totals([1000, 500], DeliveryOption::Pickup)?;

        assert_eq!(
            totals,
            OrderTotals {
                subtotal: 1500,
                delivery_fee: 0,
                tax: 0,
                total: 1500,
            }
        );

        Ok(())
    }

    #[test]
    fn delivery_fee_is_not_taxed() -> TestResult {
        let totals = policy(1000).totals([2000], DeliveryOption::Delivery)?;

        assert_eq!(totals.delivery_fee, 500);
        assert_eq!(totals.tax, 200);
        assert_eq!(totals.total, 2700);

        Ok(())
    }

    #[test]
    fn tax_rounds_half_up() -> TestResult {
        // 825 bps of 1010 is 83.325 and 825 bps of 1030 is 84.975
        assert_eq!(policy(825).tax_on(1010)?, 83);
        assert_eq!(policy(825).tax_on(1030)?, 85);
        assert_eq!(policy(5000).tax_on(1)?, 1);

        Ok(())
    }

    #[test]
    fn overflow_is_a_validation_error() {
        assert!(matches!(
            OrderPolicy::line_total(u64::MAX, 2),
            Err(OrdersServiceError::Validation(_))
        ));
        assert!(matches!(
            policy(0).totals([u64::MAX, 1], DeliveryOption::Pickup),
            Err(OrdersServiceError::Validation(_))
        ));
    }
}
