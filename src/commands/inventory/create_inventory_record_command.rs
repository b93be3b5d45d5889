use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::InventoryRecord,
    repositories::Stores,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Starts tracking a product at a location. One record per pair.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRecordCommand {
    pub product_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub min_quantity: i32,
    #[validate(range(min = 0))]
    pub max_quantity: i32,
}

#[async_trait::async_trait]
impl Command for CreateInventoryRecordCommand {
    type Result = InventoryRecord;

    #[instrument(skip(self, stores, event_sender), fields(product_id = %self.product_id, location_id = %self.location_id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        if self.min_quantity > self.max_quantity {
            return Err(ServiceError::ValidationError(
                "min_quantity cannot exceed max_quantity".to_string(),
            ));
        }

        if !stores.products.contains(self.product_id) {
            return Err(ServiceError::not_found("Product", self.product_id));
        }
        if !stores.locations.contains(self.location_id) {
            return Err(ServiceError::not_found("Location", self.location_id));
        }

        let record = stores
            .inventory
            .insert_unique(InventoryRecord::new(
                self.product_id,
                self.location_id,
                self.quantity,
                self.min_quantity,
                self.max_quantity,
            ))
            .map_err(|existing| {
                ServiceError::Conflict(format!(
                    "Product is already stocked at this location (inventory record {})",
                    existing
                ))
            })?;

        info!(inventory_id = %record.id, "Inventory record created");
        event_sender
            .publish(Event::InventoryRecordCreated(record.id))
            .await;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Product};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn seeded() -> (Arc<Stores>, Arc<EventSender>, mpsc::Receiver<Event>, Uuid, Uuid) {
        let stores = Arc::new(Stores::new());
        let (tx, rx) = mpsc::channel(8);
        let product = stores.products.insert(Product {
            id: Uuid::new_v4(),
            name: "Snickers Bar".into(),
            sku: "CND-005".into(),
            supplier_id: Uuid::new_v4(),
            price: dec!(1.75),
            category: "Candy".into(),
        });
        let location = stores.locations.insert(Location {
            id: Uuid::new_v4(),
            name: "Lobby Machine".into(),
        });
        (
            stores,
            Arc::new(EventSender::new(tx)),
            rx,
            product.id,
            location.id,
        )
    }

    fn command(product_id: Uuid, location_id: Uuid) -> CreateInventoryRecordCommand {
        CreateInventoryRecordCommand {
            product_id,
            location_id,
            quantity: 8,
            min_quantity: 30,
            max_quantity: 150,
        }
    }

    #[tokio::test]
    async fn creates_once_per_slot() {
        let (stores, events, _rx, product, location) = seeded();

        let record = command(product, location)
            .execute(stores.clone(), events.clone())
            .await
            .unwrap();
        assert_eq!(record.quantity, 8);

        let duplicate = command(product, location)
            .execute(stores.clone(), events.clone())
            .await;
        assert_matches!(duplicate, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejects_inverted_levels() {
        let (stores, events, _rx, product, location) = seeded();
        let result = CreateInventoryRecordCommand {
            min_quantity: 200,
            ..command(product, location)
        }
        .execute(stores, events)
        .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let (stores, events, _rx, product, _) = seeded();
        let result = command(product, Uuid::new_v4()).execute(stores, events).await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
