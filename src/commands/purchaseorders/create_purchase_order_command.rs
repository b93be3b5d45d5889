use crate::{
    commands::{validate_unit_price, Command},
    errors::ServiceError,
    events::{Event, EventSender},
    ledger,
    metrics::PO_CREATIONS,
    models::{LineItem, PurchaseOrder},
    repositories::Stores,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{reject, resolve_line_product};

const COMMAND: &str = "create";

/// Opens a new draft. The supplier may be picked later, but line items need
/// one to be checked against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderCommand {
    pub supplier_id: Option<Uuid>,
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate]
    pub items: Vec<NewLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewLineItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Defaults to the product's catalog price.
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
}

#[async_trait::async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, stores, event_sender))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| reject(COMMAND, ServiceError::from(e)))?;

        let order = self.build(&stores).map_err(|e| reject(COMMAND, e))?;
        let order = stores.purchase_orders.orders().insert(order);

        info!(
            purchase_order_id = %order.id,
            po_number = %order.po_number,
            line_items = order.line_items.len(),
            "Purchase order created"
        );
        event_sender
            .publish(Event::PurchaseOrderCreated(order.id))
            .await;
        PO_CREATIONS.inc();

        Ok(order)
    }
}

impl CreatePurchaseOrderCommand {
    fn build(&self, stores: &Stores) -> Result<PurchaseOrder, ServiceError> {
        if let Some(supplier_id) = self.supplier_id {
            if !stores.suppliers.contains(supplier_id) {
                return Err(ServiceError::not_found("Supplier", supplier_id));
            }
        }

        let line_items = self
            .items
            .iter()
            .map(|item| {
                let product = resolve_line_product(stores, self.supplier_id, item.product_id)?;
                Ok(LineItem::new(
                    product.id,
                    item.quantity,
                    item.unit_price.unwrap_or(product.price),
                ))
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;
        ledger::aggregate(&line_items)?;

        let mut order = PurchaseOrder::new_draft(
            stores.purchase_orders.next_po_number(),
            self.supplier_id,
            Utc::now().date_naive(),
            self.expected_date,
        );
        order.line_items = line_items;
        Ok(order)
    }
}
