use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::PO_SUBMISSIONS,
    models::{PurchaseOrder, PurchaseOrderStatus},
    repositories::Stores,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{reject, update_order};

const COMMAND: &str = "submit";

/// Sends a draft to its supplier: `draft -> awaiting_delivery`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPurchaseOrderCommand {
    pub id: Uuid,
}

#[async_trait::async_trait]
impl Command for SubmitPurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let (order, _) = update_order(&stores, self.id, |order| {
            // Can only submit from Draft status
            if order.status != PurchaseOrderStatus::Draft {
                return Err(ServiceError::InvalidStatus(format!(
                    "Cannot submit purchase order in {} status. Must be in draft status.",
                    order.status
                )));
            }
            if order.supplier_id.is_none() {
                return Err(ServiceError::ValidationError(
                    "Supplier required".to_string(),
                ));
            }
            if order.line_items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Line items required".to_string(),
                ));
            }
            order.status = PurchaseOrderStatus::AwaitingDelivery;
            Ok(())
        })
        .map_err(|e| reject(COMMAND, e))?;

        info!(po_number = %order.po_number, "Purchase order submitted successfully");
        event_sender
            .publish(Event::PurchaseOrderSubmitted(order.id))
            .await;
        PO_SUBMISSIONS.inc();

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::fixture;
    use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, NewLineItem};
    use crate::models::PaymentStatus;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn submit_moves_draft_to_awaiting_delivery() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            expected_date: None,
            items: vec![NewLineItem {
                product_id: fx.chips.id,
                quantity: 50,
                unit_price: None,
            }],
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let submitted = SubmitPurchaseOrderCommand { id: order.id }
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();

        assert_eq!(submitted.status, PurchaseOrderStatus::AwaitingDelivery);
        assert_eq!(submitted.payment_status, PaymentStatus::None);

        let again = SubmitPurchaseOrderCommand { id: order.id }
            .execute(fx.stores.clone(), fx.events.clone())
            .await;
        assert_matches!(again, Err(ServiceError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn submit_requires_supplier_then_lines() {
        let fx = fixture();
        let empty = CreatePurchaseOrderCommand::default()
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();

        let result = SubmitPurchaseOrderCommand { id: empty.id }
            .execute(fx.stores.clone(), fx.events.clone())
            .await;
        assert_matches!(
            result,
            Err(ServiceError::ValidationError(msg)) if msg == "Supplier required"
        );

        let no_lines = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            ..Default::default()
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let result = SubmitPurchaseOrderCommand { id: no_lines.id }
            .execute(fx.stores.clone(), fx.events.clone())
            .await;
        assert_matches!(
            result,
            Err(ServiceError::ValidationError(msg)) if msg == "Line items required"
        );
        assert_eq!(
            fx.stores
                .purchase_orders
                .orders()
                .get(no_lines.id)
                .unwrap()
                .status,
            PurchaseOrderStatus::Draft
        );
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let fx = fixture();
        let result = SubmitPurchaseOrderCommand { id: Uuid::new_v4() }
            .execute(fx.stores.clone(), fx.events.clone())
            .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
