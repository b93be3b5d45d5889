use crate::{
    commands::{validate_unit_price, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{LineItem, PurchaseOrder},
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

const COMMAND: &str = "add_line_item";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddLineItemCommand {
    #[serde(default)]
    pub purchase_order_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Defaults to the product's catalog price.
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
}

#[async_trait::async_trait]
impl Command for AddLineItemCommand {
    /// The updated order and the id of the new line.
    type Result = (PurchaseOrder, Uuid);

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.purchase_order_id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| reject(COMMAND, ServiceError::from(e)))?;

        let (order, line_item_id) = update_order(&stores, self.purchase_order_id, |order| {
            ensure_editable(order)?;
            let product = resolve_line_product(&stores, order.supplier_id, self.product_id)?;
            let item = LineItem::new(
                product.id,
                self.quantity,
                self.unit_price.unwrap_or(product.price),
            );
            let id = item.id;
            order.line_items.push(item);
            order.totals()?;
            Ok(id)
        })
        .map_err(|e| reject(COMMAND, e))?;

        info!(%line_item_id, product_id = %self.product_id, "Line item added");
        event_sender
            .publish(Event::PurchaseOrderUpdated(order.id))
            .await;

        Ok((order, line_item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::fixture;
    use crate::commands::purchaseorders::CreatePurchaseOrderCommand;
    use crate::models::PurchaseOrderStatus;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn adds_line_at_catalog_price() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            ..Default::default()
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let (updated, line_id) = AddLineItemCommand {
            purchase_order_id: order.id,
            product_id: fx.salsa.id,
            quantity: 30,
            unit_price: None,
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let line = updated.line_item(line_id).unwrap();
        assert_eq!(line.unit_price, dec!(2.25));
        assert_eq!(line.quantity_received, 0);
        assert_eq!(updated.totals().unwrap().subtotal, dec!(67.50));
    }

    #[tokio::test]
    async fn needs_a_supplier_first() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand::default()
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();

        let result = AddLineItemCommand {
            purchase_order_id: order.id,
            product_id: fx.chips.id,
            quantity: 1,
            unit_price: None,
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await;

        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn submitted_orders_are_locked() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            ..Default::default()
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();
        fx.stores
            .purchase_orders
            .orders()
            .update(order.id, |o| {
                o.status = PurchaseOrderStatus::AwaitingDelivery;
                Ok::<_, ServiceError>(())
            })
            .unwrap()
            .unwrap();

        let result = AddLineItemCommand {
            purchase_order_id: order.id,
            product_id: fx.chips.id,
            quantity: 1,
            unit_price: None,
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await;

        assert_matches!(result, Err(ServiceError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn out_of_range_total_is_not_stored() {
        let fx = fixture();
        let mut pricey = fx.chips.clone();
        pricey.id = Uuid::new_v4();
        pricey.sku = "SNK-999".into();
        pricey.price = "75000000000000000000000000000".parse().unwrap();
        let pricey = fx.stores.products.insert(pricey);
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            ..Default::default()
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let result = AddLineItemCommand {
            purchase_order_id: order.id,
            product_id: pricey.id,
            quantity: 1,
            unit_price: None,
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await;

        assert_matches!(result, Err(ServiceError::BadRequest(_)));
        let stored = fx.stores.purchase_orders.orders().get(order.id).unwrap();
        assert!(stored.line_items.is_empty());
        assert!(stored.totals().is_ok());
    }
}
