use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::LedgerError;
use crate::models::{LineItem, PurchaseOrder, PurchaseOrderStatus};

/// A request to record goods arriving against one line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub line_item_id: Uuid,
    /// Raw requested quantity, clamped before it is applied.
    pub requested: i64,
}

/// What a receiving action changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReceiptOutcome {
    pub previous_status: PurchaseOrderStatus,
    pub status: PurchaseOrderStatus,
    /// Quantity accepted per line after clamping, in request order.
    pub accepted: Vec<AcceptedReceipt>,
    pub units_received: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct AcceptedReceipt {
    pub line_item_id: Uuid,
    pub quantity: i32,
}

/// Totals shown on the receiving worksheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReceivingSummary {
    pub total_ordered: i64,
    pub total_received: i64,
    pub total_remaining: i64,
}

/// Clamps a requested receiving quantity into `[0, quantity - quantity_received]`.
/// A fully received line always yields 0.
pub fn clamp_receiving_quantity(item: &LineItem, requested: i64) -> i32 {
    let remaining = item.remaining();
    if remaining == 0 {
        return 0;
    }
    // remaining fits in i32, so the clamped value does too
    requested.clamp(0, i64::from(remaining)) as i32
}

/// Reads free-form quantity input the way a numeric form field does: leading
/// whitespace and an optional sign, then the leading run of digits. Anything
/// without digits is 0; values beyond `i64` saturate.
pub fn parse_requested_quantity(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}

/// Derives the order status from a full scan of its line items.
///
/// Every line fully received gives `Complete`; any received quantity gives
/// `PartiallyReceived`; otherwise the current status is kept. Recomputed from
/// scratch every time, so calling it twice on the same items agrees.
pub fn derive_status(current: PurchaseOrderStatus, items: &[LineItem]) -> PurchaseOrderStatus {
    let all_received = items.iter().all(LineItem::is_fully_received);
    let some_received = items.iter().any(|item| item.quantity_received > 0);

    if all_received {
        PurchaseOrderStatus::Complete
    } else if some_received {
        PurchaseOrderStatus::PartiallyReceived
    } else {
        current
    }
}

/// Applies receipts to the order's line items and re-derives its status.
///
/// Orders outside `AwaitingDelivery`/`PartiallyReceived` and receipts naming a
/// line the order does not have are rejected before anything is touched.
pub fn apply_receipt(
    order: &mut PurchaseOrder,
    receipts: &[Receipt],
) -> Result<ReceiptOutcome, LedgerError> {
    if !order.status.can_receive() {
        return Err(LedgerError::NotReceivable(order.status));
    }
    if let Some(unknown) = receipts
        .iter()
        .find(|receipt| order.line_item(receipt.line_item_id).is_none())
    {
        return Err(LedgerError::UnknownLineItem(unknown.line_item_id));
    }

    let previous_status = order.status;
    let mut accepted = Vec::with_capacity(receipts.len());
    let mut units_received = 0i64;

    for receipt in receipts {
        if let Some(item) = order.line_item_mut(receipt.line_item_id) {
            let quantity = clamp_receiving_quantity(item, receipt.requested);
            item.quantity_received += quantity;
            units_received += i64::from(quantity);
            accepted.push(AcceptedReceipt {
                line_item_id: receipt.line_item_id,
                quantity,
            });
        }
    }

    order.status = derive_status(order.status, &order.line_items);

    Ok(ReceiptOutcome {
        previous_status,
        status: order.status,
        accepted,
        units_received,
    })
}

pub fn summarize(items: &[LineItem]) -> ReceivingSummary {
    items
        .iter()
        .fold(ReceivingSummary::default(), |mut summary, item| {
            summary.total_ordered += i64::from(item.quantity);
            summary.total_received += i64::from(item.quantity_received);
            summary.total_remaining += i64::from(item.remaining());
            summary
        })
}
