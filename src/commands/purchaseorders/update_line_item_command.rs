use crate::{
    commands::{validate_unit_price, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::PurchaseOrder,
    repositories::Stores,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{ensure_editable, reject, resolve_line_product, update_order};

const COMMAND: &str = "update_line_item";

/// Edits one draft line. Switching product resets the unit price to the new
/// product's catalog price unless a price is given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLineItemCommand {
    #[serde(default)]
    pub purchase_order_id: Uuid,
    #[serde(default)]
    pub line_item_id: Uuid,
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
}

#[async_trait::async_trait]
impl Command for UpdateLineItemCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.purchase_order_id, line_item_id = %self.line_item_id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| reject(COMMAND, ServiceError::from(e)))?;

        let (order, _) = update_order(&stores, self.purchase_order_id, |order| {
            ensure_editable(order)?;
            let replacement = self
                .product_id
                .map(|product_id| resolve_line_product(&stores, order.supplier_id, product_id))
                .transpose()?;

            let item = order.line_item_mut(self.line_item_id).ok_or_else(|| {
                ServiceError::not_found("Line item", self.line_item_id)
            })?;
            if let Some(product) = replacement {
                item.product_id = product.id;
                item.unit_price = product.price;
            }
            if let Some(quantity) = self.quantity {
                item.quantity = quantity;
            }
            if let Some(unit_price) = self.unit_price {
                item.unit_price = unit_price;
            }
            order.totals()?;
            Ok(())
        })
        .map_err(|e| reject(COMMAND, e))?;

        info!("Line item updated");
        event_sender
            .publish(Event::PurchaseOrderUpdated(order.id))
            .await;

        Ok(order)
    }
}
