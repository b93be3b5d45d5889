use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    ledger::{self, Receipt, ReceiptOutcome},
    metrics::{PO_RECEIPTS, PO_UNITS_RECEIVED},
    models::PurchaseOrder,
    repositories::Stores,
};

use super::{reject, update_order};

const COMMAND: &str = "receive";

/// Records goods arriving against an order's lines. Requested quantities are
/// clamped to what is still outstanding on each line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReceivePurchaseOrderCommand {
    #[serde(default)]
    pub id: Uuid,
    #[validate(length(min = 1, message = "At least one line must be received"))]
    pub items: Vec<ReceivedLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceivedLine {
    pub line_item_id: Uuid,
    /// Accepts a number or free-form text; text without leading digits counts as 0.
    #[serde(deserialize_with = "lenient_quantity")]
    #[schema(value_type = i64)]
    pub received_quantity: i64,
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or_default(),
        Value::String(text) => ledger::parse_requested_quantity(&text),
        _ => 0,
    })
}

#[derive(Debug, Clone)]
pub struct ReceivePurchaseOrderResult {
    pub order: PurchaseOrder,
    pub outcome: ReceiptOutcome,
}

#[async_trait]
impl Command for ReceivePurchaseOrderCommand {
    type Result = ReceivePurchaseOrderResult;

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| reject(COMMAND, ServiceError::from(e)))?;

        let receipts: Vec<Receipt> = self
            .items
            .iter()
            .map(|line| Receipt {
                line_item_id: line.line_item_id,
                requested: line.received_quantity,
            })
            .collect();

        let (order, outcome) = update_order(&stores, self.id, |order| {
            ledger::apply_receipt(order, &receipts).map_err(ServiceError::from)
        })
        .map_err(|e| reject(COMMAND, e))?;

        info!(
            previous_status = %outcome.previous_status,
            status = %outcome.status,
            units_received = outcome.units_received,
            "Purchase order received"
        );
        event_sender
            .publish(Event::PurchaseOrderReceived {
                purchase_order_id: order.id,
                previous_status: outcome.previous_status,
                new_status: outcome.status,
                units_received: outcome.units_received,
            })
            .await;
        PO_RECEIPTS.inc();
        PO_UNITS_RECEIVED.inc_by(outcome.units_received.max(0) as u64);

        Ok(ReceivePurchaseOrderResult { order, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::{fixture, Fixture};
    use crate::commands::purchaseorders::{
        CreatePurchaseOrderCommand, NewLineItem, SubmitPurchaseOrderCommand,
    };
    use crate::models::PurchaseOrderStatus;
    use assert_matches::assert_matches;

    async fn submitted_order(fx: &Fixture) -> PurchaseOrder {
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            expected_date: None,
            items: vec![
                NewLineItem {
                    product_id: fx.chips.id,
                    quantity: 50,
                    unit_price: None,
                },
                NewLineItem {
                    product_id: fx.salsa.id,
                    quantity: 30,
                    unit_price: None,
                },
            ],
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();
        SubmitPurchaseOrderCommand { id: order.id }
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap()
    }

    fn receive(order: &PurchaseOrder, quantities: [i64; 2]) -> ReceivePurchaseOrderCommand {
        ReceivePurchaseOrderCommand {
            id: order.id,
            items: order
                .line_items
                .iter()
                .zip(quantities)
                .map(|(item, received_quantity)| ReceivedLine {
                    line_item_id: item.id,
                    received_quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn partial_then_complete() {
        let fx = fixture();
        let order = submitted_order(&fx).await;

        let first = receive(&order, [50, 10])
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();
        assert_eq!(first.outcome.status, PurchaseOrderStatus::PartiallyReceived);

        let second = receive(&order, [0, 100])
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();
        assert_eq!(second.outcome.status, PurchaseOrderStatus::Complete);
        assert_eq!(second.outcome.units_received, 20);
        assert!(second.order.line_items.iter().all(|i| i.is_fully_received()));
    }

    #[tokio::test]
    async fn draft_orders_cannot_receive() {
        let fx = fixture();
        let draft = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            expected_date: None,
            items: vec![
                NewLineItem {
                    product_id: fx.chips.id,
                    quantity: 5,
                    unit_price: None,
                },
                NewLineItem {
                    product_id: fx.salsa.id,
                    quantity: 5,
                    unit_price: None,
                },
            ],
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let result = receive(&draft, [5, 5])
            .execute(fx.stores.clone(), fx.events.clone())
            .await;

        assert_matches!(result, Err(ServiceError::InvalidStatus(_)));
        let stored = fx.stores.purchase_orders.orders().get(draft.id).unwrap();
        assert!(stored.line_items.iter().all(|i| i.quantity_received == 0));
    }

    #[test]
    fn received_quantity_accepts_numbers_and_text() {
        let id = Uuid::new_v4();
        let parse = |raw: &str| -> i64 {
            let json = format!(r#"{{"line_item_id":"{}","received_quantity":{}}}"#, id, raw);
            serde_json::from_str::<ReceivedLine>(&json)
                .unwrap()
                .received_quantity
        };
        assert_eq!(parse("12"), 12);
        assert_eq!(parse("12.7"), 12);
        assert_eq!(parse(r#""7 boxes""#), 7);
        assert_eq!(parse(r#""lots""#), 0);
        assert_eq!(parse("null"), 0);
    }
}
