use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PaymentStatus, PurchaseOrder},
    repositories::Stores,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{ensure_editable, reject, update_order};

const COMMAND: &str = "update";

/// Header changes. Omitted fields are left alone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderCommand {
    #[serde(default)]
    pub id: Uuid,
    /// Only while the order is a draft; every existing line must be sold by
    /// the new supplier.
    pub supplier_id: Option<Uuid>,
    /// Until the order is complete.
    pub expected_date: Option<NaiveDate>,
    /// At any stage.
    pub payment_status: Option<PaymentStatus>,
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| reject(COMMAND, ServiceError::from(e)))?;

        if let Some(supplier_id) = self.supplier_id {
            if !stores.suppliers.contains(supplier_id) {
                return Err(reject(
                    COMMAND,
                    ServiceError::not_found("Supplier", supplier_id),
                ));
            }
        }

        let (order, _) = update_order(&stores, self.id, |order| self.apply(&stores, order))
            .map_err(|e| reject(COMMAND, e))?;

        info!(
            po_number = %order.po_number,
            status = %order.status,
            payment_status = %order.payment_status,
            "Purchase order updated"
        );
        event_sender
            .publish(Event::PurchaseOrderUpdated(order.id))
            .await;

        Ok(order)
    }
}

impl UpdatePurchaseOrderCommand {
    fn apply(&self, stores: &Stores, order: &mut PurchaseOrder) -> Result<(), ServiceError> {
        if let Some(supplier_id) = self.supplier_id.filter(|id| order.supplier_id != Some(*id)) {
            ensure_editable(order)?;
            let foreign = order.line_items.iter().find(|item| {
                stores
                    .products
                    .get(item.product_id)
                    .map_or(true, |product| product.supplier_id != supplier_id)
            });
            if let Some(item) = foreign {
                return Err(ServiceError::ValidationError(format!(
                    "Line item {} is not sold by supplier {}; remove it before changing supplier",
                    item.id, supplier_id
                )));
            }
            order.supplier_id = Some(supplier_id);
        }

        if let Some(expected_date) = self.expected_date {
            if !order.status.can_reschedule() {
                return Err(ServiceError::InvalidStatus(format!(
                    "Purchase order {} is complete; its expected date is fixed",
                    order.po_number
                )));
            }
            order.expected_date = Some(expected_date);
        }

        if let Some(payment_status) = self.payment_status {
            order.payment_status = payment_status;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::fixture;
    use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, NewLineItem};
    use crate::models::PurchaseOrderStatus;
    use assert_matches::assert_matches;

    fn update(id: Uuid) -> UpdatePurchaseOrderCommand {
        UpdatePurchaseOrderCommand {
            id,
            supplier_id: None,
            expected_date: None,
            payment_status: None,
        }
    }

    #[tokio::test]
    async fn changing_supplier_rejects_foreign_lines() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand {
            supplier_id: Some(fx.supplier.id),
            expected_date: None,
            items: vec![NewLineItem {
                product_id: fx.chips.id,
                quantity: 5,
                unit_price: None,
            }],
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        let result = UpdatePurchaseOrderCommand {
            supplier_id: Some(fx.other_supplier.id),
            expected_date: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            ..update(order.id)
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await;

        assert_matches!(result, Err(ServiceError::ValidationError(_)));
        // nothing applied, including the date
        let stored = fx.stores.purchase_orders.orders().get(order.id).unwrap();
        assert_eq!(stored.supplier_id, Some(fx.supplier.id));
        assert_eq!(stored.expected_date, None);
    }

    #[tokio::test]
    async fn complete_orders_keep_their_date_but_take_payment_status() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand::default()
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();
        fx.stores
            .purchase_orders
            .orders()
            .update(order.id, |o| {
                o.status = PurchaseOrderStatus::Complete;
                Ok::<_, ServiceError>(())
            })
            .unwrap()
            .unwrap();

        let reschedule = UpdatePurchaseOrderCommand {
            expected_date: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            ..update(order.id)
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await;
        assert_matches!(reschedule, Err(ServiceError::InvalidStatus(_)));

        let paid = UpdatePurchaseOrderCommand {
            payment_status: Some(PaymentStatus::Paid),
            ..update(order.id)
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn sets_supplier_on_empty_draft() {
        let fx = fixture();
        let order = CreatePurchaseOrderCommand::default()
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();

        let updated = UpdatePurchaseOrderCommand {
            supplier_id: Some(fx.other_supplier.id),
            ..update(order.id)
        }
        .execute(fx.stores.clone(), fx.events.clone())
        .await
        .unwrap();

        assert_eq!(updated.supplier_id, Some(fx.other_supplier.id));
    }
}
