use rust_decimal::Decimal;

use super::LedgerError;
use crate::models::{InventoryRecord, StockStatus};

/// Classifies a record against its min/max thresholds.
///
/// Checked in order: at or below half the minimum is `Critical`, at or below
/// the minimum is `Low`, at or above the maximum is `Overstocked`.
pub fn classify(record: &InventoryRecord) -> StockStatus {
    classify_levels(record.quantity, record.min_quantity, record.max_quantity)
}

pub fn classify_levels(quantity: i32, min_quantity: i32, max_quantity: i32) -> StockStatus {
    let quantity = i64::from(quantity);
    let min_quantity = i64::from(min_quantity);

    // q <= min * 0.5 without leaving integers
    if 2 * quantity <= min_quantity {
        StockStatus::Critical
    } else if quantity <= min_quantity {
        StockStatus::Low
    } else if quantity >= i64::from(max_quantity) {
        StockStatus::Overstocked
    } else {
        StockStatus::Ok
    }
}

/// New on-hand quantity after a signed adjustment. Rejects results below zero
/// or outside `i32`; a zero delta is allowed.
pub fn apply_adjustment(current: i32, delta: i32) -> Result<i32, LedgerError> {
    let next = i64::from(current) + i64::from(delta);
    if next < 0 {
        return Err(LedgerError::NegativeStock { current, delta });
    }
    i32::try_from(next).map_err(|_| LedgerError::QuantityOverflow { current, delta })
}

pub fn fill_percentage(quantity: i32, max_quantity: i32) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if max_quantity <= 0 {
        return hundred;
    }
    let percentage = Decimal::from(quantity.max(0)) * hundred / Decimal::from(max_quantity);
    percentage.min(hundred)
}
