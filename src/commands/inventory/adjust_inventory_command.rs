use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    ledger,
    metrics::{INVENTORY_ADJUSTMENTS, INVENTORY_ADJUSTMENT_FAILURES},
    models::InventoryRecord,
    repositories::Stores,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Manual stock correction by a signed delta.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdjustInventoryCommand {
    #[serde(default)]
    pub inventory_id: Uuid,
    /// Can be positive or negative
    pub delta: i32,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustInventoryResult {
    pub record: InventoryRecord,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub delta: i32,
    pub adjusted_at: DateTime<Utc>,
}

#[async_trait::async_trait]
impl Command for AdjustInventoryCommand {
    type Result = AdjustInventoryResult;

    #[instrument(skip(self, stores, event_sender), fields(inventory_id = %self.inventory_id, delta = self.delta))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| self.fail("validation_error", ServiceError::from(e)))?;

        let (record, previous_quantity) = stores
            .inventory
            .records()
            .update(self.inventory_id, |record| {
                let previous = record.quantity;
                record.quantity = ledger::apply_adjustment(previous, self.delta)?;
                Ok::<_, ledger::LedgerError>(previous)
            })
            .ok_or_else(|| {
                self.fail(
                    "not_found",
                    ServiceError::not_found("Inventory record", self.inventory_id),
                )
            })?
            .map_err(|e| self.fail(e.kind(), ServiceError::from(e)))?;

        info!(
            product_id = %record.product_id,
            location_id = %record.location_id,
            previous_quantity,
            new_quantity = record.quantity,
            reason = self.reason.as_deref().unwrap_or("unspecified"),
            "Inventory adjusted successfully"
        );
        event_sender
            .publish(Event::InventoryAdjusted {
                inventory_id: record.id,
                product_id: record.product_id,
                location_id: record.location_id,
                old_quantity: previous_quantity,
                new_quantity: record.quantity,
                reason: self.reason.clone(),
            })
            .await;
        INVENTORY_ADJUSTMENTS.inc();

        Ok(AdjustInventoryResult {
            new_quantity: record.quantity,
            record,
            previous_quantity,
            delta: self.delta,
            adjusted_at: Utc::now(),
        })
    }
}

impl AdjustInventoryCommand {
    fn fail(&self, error_type: &str, error: ServiceError) -> ServiceError {
        INVENTORY_ADJUSTMENT_FAILURES
            .with_label_values(&[error_type])
            .inc();
        warn!(error = %error, "Inventory adjustment rejected");
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    fn setup(quantity: i32) -> (Arc<Stores>, Arc<EventSender>, mpsc::Receiver<Event>, Uuid) {
        let stores = Arc::new(Stores::new());
        let (tx, rx) = mpsc::channel(8);
        let record = stores
            .inventory
            .insert_unique(InventoryRecord::new(
                Uuid::new_v4(),
                Uuid::new_v4(),
                quantity,
                30,
                200,
            ))
            .unwrap();
        (stores, Arc::new(EventSender::new(tx)), rx, record.id)
    }

    #[tokio::test]
    async fn applies_positive_and_negative_deltas() {
        let (stores, events, mut rx, id) = setup(150);

        let result = AdjustInventoryCommand {
            inventory_id: id,
            delta: -40,
            reason: Some("Damaged".into()),
        }
        .execute(stores.clone(), events.clone())
        .await
        .unwrap();

        assert_eq!(result.previous_quantity, 150);
        assert_eq!(result.new_quantity, 110);
        assert_matches!(
            rx.recv().await,
            Some(Event::InventoryAdjusted { old_quantity: 150, new_quantity: 110, .. })
        );
    }

    #[tokio::test]
    async fn negative_result_is_rejected_and_quantity_kept() {
        let (stores, events, _rx, id) = setup(150);

        let result = AdjustInventoryCommand {
            inventory_id: id,
            delta: -200,
            reason: None,
        }
        .execute(stores.clone(), events.clone())
        .await;

        assert_matches!(
            result,
            Err(ServiceError::ValidationError(msg)) if msg.contains("Quantity cannot be negative")
        );
        assert_eq!(stores.inventory.records().get(id).unwrap().quantity, 150);
    }

    #[tokio::test]
    async fn overflow_is_counted_under_its_own_label() {
        let (stores, events, _rx, id) = setup(i32::MAX - 1);
        let overflows = INVENTORY_ADJUSTMENT_FAILURES.with_label_values(&["quantity_overflow"]);
        let before = overflows.get();

        let result = AdjustInventoryCommand {
            inventory_id: id,
            delta: 10,
            reason: None,
        }
        .execute(stores.clone(), events)
        .await;

        assert_matches!(result, Err(ServiceError::ValidationError(_)));
        assert!(overflows.get() > before);
        assert_eq!(stores.inventory.records().get(id).unwrap().quantity, i32::MAX - 1);
    }

    #[tokio::test]
    async fn zero_delta_is_accepted() {
        let (stores, events, _rx, id) = setup(12);
        let result = AdjustInventoryCommand {
            inventory_id: id,
            delta: 0,
            reason: None,
        }
        .execute(stores, events)
        .await
        .unwrap();
        assert_eq!(result.new_quantity, 12);
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let (stores, events, _rx, _) = setup(1);
        let result = AdjustInventoryCommand {
            inventory_id: Uuid::new_v4(),
            delta: 1,
            reason: None,
        }
        .execute(stores, events)
        .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
