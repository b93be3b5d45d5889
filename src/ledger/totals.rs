use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::LedgerError;
use crate::models::LineItem;

/// Flat sales tax applied to every purchase order.
pub const TAX_RATE: Decimal = dec!(0.08);

/// Largest unit price accepted for a product or line item.
pub const MAX_UNIT_PRICE: Decimal = dec!(1000000000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Rounded to cents. Only for presentation; arithmetic stays on the
    /// unrounded values.
    pub fn for_display(&self) -> OrderTotals {
        OrderTotals {
            subtotal: to_cents(self.subtotal),
            tax: to_cents(self.tax),
            total: to_cents(self.total),
        }
    }
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal, LedgerError> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or(LedgerError::AmountOverflow)
}

/// Sums `quantity × unit_price` over the items and applies [`TAX_RATE`].
/// Fails instead of panicking when an amount leaves the `Decimal` range.
pub fn aggregate(items: &[LineItem]) -> Result<OrderTotals, LedgerError> {
    let subtotal = items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(line_total(item.quantity, item.unit_price)?)
            .ok_or(LedgerError::AmountOverflow)
    })?;
    let tax = subtotal
        .checked_mul(TAX_RATE)
        .ok_or(LedgerError::AmountOverflow)?;
    let total = subtotal
        .checked_add(tax)
        .ok_or(LedgerError::AmountOverflow)?;

    Ok(OrderTotals {
        subtotal,
        tax,
        total,
    })
}
