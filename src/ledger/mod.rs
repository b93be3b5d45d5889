//! Purchase order ledger.
//!
//! Pure, synchronous computations over purchase orders and inventory records:
//! line-item aggregation, receiving-quantity clamping, status derivation after
//! a receipt, and stock-level classification. Nothing in here touches a store,
//! logs, or publishes events; callers own the records and pass them in.

pub mod receiving;
pub mod stock;
pub mod totals;

use thiserror::Error;
use uuid::Uuid;

use crate::models::PurchaseOrderStatus;

pub use receiving::{
    apply_receipt, clamp_receiving_quantity, derive_status, parse_requested_quantity, summarize,
    AcceptedReceipt, Receipt, ReceiptOutcome, ReceivingSummary,
};
pub use stock::{apply_adjustment, classify, fill_percentage};
pub use totals::{aggregate, OrderTotals, MAX_UNIT_PRICE, TAX_RATE};

/// Rejections raised by the ledger. Each one leaves its input untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("purchase order in status '{0}' cannot receive items")]
    NotReceivable(PurchaseOrderStatus),

    #[error("line item {0} does not belong to this purchase order")]
    UnknownLineItem(Uuid),

    #[error("adjusting quantity {current} by {delta} would make stock negative")]
    NegativeStock { current: i32, delta: i32 },

    #[error("adjusting quantity {current} by {delta} overflows the stock counter")]
    QuantityOverflow { current: i32, delta: i32 },

    #[error("order amount is out of range")]
    AmountOverflow,
}

impl LedgerError {
    /// Metrics label for the rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotReceivable(_) => "not_receivable",
            Self::UnknownLineItem(_) => "unknown_line_item",
            Self::NegativeStock { .. } => "negative_stock",
            Self::QuantityOverflow { .. } => "quantity_overflow",
            Self::AmountOverflow => "amount_overflow",
        }
    }
}
