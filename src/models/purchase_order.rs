use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Descriptor, Tone};
use crate::ledger::{
    totals::{self, OrderTotals},
    LedgerError,
};

/// Lifecycle of a purchase order. Progression is forward-only:
/// `Draft -> AwaitingDelivery -> PartiallyReceived -> Complete`, with
/// `AwaitingDelivery -> Complete` allowed when a single receipt covers every line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    AwaitingDelivery,
    PartiallyReceived,
    Complete,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 4] = [
        PurchaseOrderStatus::Draft,
        PurchaseOrderStatus::AwaitingDelivery,
        PurchaseOrderStatus::PartiallyReceived,
        PurchaseOrderStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AwaitingDelivery => "awaiting_delivery",
            Self::PartiallyReceived => "partially_received",
            Self::Complete => "complete",
        }
    }

    pub fn descriptor(&self) -> Descriptor {
        match self {
            Self::Draft => Descriptor::new("Draft", Tone::Neutral),
            Self::AwaitingDelivery => Descriptor::new("Awaiting Delivery", Tone::Info),
            Self::PartiallyReceived => Descriptor::new("Partially Received", Tone::Warning),
            Self::Complete => Descriptor::new("Complete", Tone::Success),
        }
    }

    /// Line items, supplier and submission are only open while drafting.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    pub fn can_receive(&self) -> bool {
        matches!(self, Self::AwaitingDelivery | Self::PartiallyReceived)
    }

    /// Expected delivery date stays editable until the order is complete.
    pub fn can_reschedule(&self) -> bool {
        !matches!(self, Self::Complete)
    }

    /// Submitted to the supplier and still waiting on goods.
    pub fn is_pending(&self) -> bool {
        self.can_receive()
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    None,
    Unpaid,
    Paid,
    PartPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::PartPaid => "part_paid",
        }
    }

    pub fn descriptor(&self) -> Descriptor {
        match self {
            Self::None => Descriptor::new("None", Tone::Neutral),
            Self::Unpaid => Descriptor::new("Unpaid", Tone::Danger),
            Self::Paid => Descriptor::new("Paid", Tone::Success),
            Self::PartPaid => Descriptor::new("Part Paid", Tone::Warning),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product/quantity/price row of a purchase order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Quantity ordered, always positive.
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Quantity physically received so far, `0..=quantity`.
    pub quantity_received: i32,
}

impl LineItem {
    pub fn new(product_id: Uuid, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            unit_price,
            quantity_received: 0,
        }
    }

    pub fn remaining(&self) -> i32 {
        (self.quantity - self.quantity_received).max(0)
    }

    pub fn is_fully_received(&self) -> bool {
        self.quantity_received >= self.quantity
    }

    pub fn line_total(&self) -> Result<Decimal, LedgerError> {
        totals::line_total(self.quantity, self.unit_price)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    /// Unset only while a draft is being put together.
    pub supplier_id: Option<Uuid>,
    pub status: PurchaseOrderStatus,
    pub payment_status: PaymentStatus,
    pub created_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub line_items: Vec<LineItem>,
}

impl PurchaseOrder {
    pub fn new_draft(
        po_number: String,
        supplier_id: Option<Uuid>,
        created_date: NaiveDate,
        expected_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            po_number,
            supplier_id,
            status: PurchaseOrderStatus::Draft,
            payment_status: PaymentStatus::None,
            created_date,
            expected_date,
            line_items: Vec::new(),
        }
    }

    pub fn totals(&self) -> Result<OrderTotals, LedgerError> {
        totals::aggregate(&self.line_items)
    }

    pub fn line_item(&self, line_item_id: Uuid) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id == line_item_id)
    }

    pub fn line_item_mut(&mut self, line_item_id: Uuid) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|item| item.id == line_item_id)
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.line_items
            .iter()
            .any(|item| item.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&PurchaseOrderStatus::PartiallyReceived).unwrap();
        assert_eq!(json, "\"partially_received\"");
        let parsed: PurchaseOrderStatus = serde_json::from_str("\"awaiting_delivery\"").unwrap();
        assert_eq!(parsed, PurchaseOrderStatus::AwaitingDelivery);
    }

    #[test]
    fn every_status_has_a_label() {
        for status in PurchaseOrderStatus::ALL {
            assert!(!status.descriptor().label.is_empty());
        }
        assert_eq!(
            PurchaseOrderStatus::AwaitingDelivery.descriptor().label,
            "Awaiting Delivery"
        );
        assert_eq!(PaymentStatus::PartPaid.descriptor().label, "Part Paid");
    }

    #[test]
    fn only_submitted_incomplete_orders_receive() {
        assert!(!PurchaseOrderStatus::Draft.can_receive());
        assert!(PurchaseOrderStatus::AwaitingDelivery.can_receive());
        assert!(PurchaseOrderStatus::PartiallyReceived.can_receive());
        assert!(!PurchaseOrderStatus::Complete.can_receive());
        assert!(PurchaseOrderStatus::PartiallyReceived.can_reschedule());
        assert!(!PurchaseOrderStatus::PartiallyReceived.is_editable());
    }

    #[test]
    fn line_item_remaining_never_negative() {
        let mut item = LineItem::new(Uuid::new_v4(), 10, dec!(1.25));
        item.quantity_received = 4;
        assert_eq!(item.remaining(), 6);
        item.quantity_received = 10;
        assert_eq!(item.remaining(), 0);
        assert!(item.is_fully_received());
        assert_eq!(item.line_total(), Ok(dec!(12.50)));
    }
}
