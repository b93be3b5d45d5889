use crate::{
    errors::ServiceError,
    repositories::{newest_first, Stores},
    services::procurement::{summaries, PurchaseOrderSummary},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub total_products: usize,
    pub active_suppliers: usize,
    /// Orders awaiting delivery or partially received.
    pub pending_orders: usize,
    /// Inventory records classified Critical or Low.
    pub low_stock_items: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub metrics: DashboardMetrics,
    pub recent_orders: Vec<PurchaseOrderSummary>,
}

/// Read-only overview across every store
#[derive(Clone)]
pub struct DashboardService {
    stores: Arc<Stores>,
    recent_orders: usize,
}

impl DashboardService {
    pub fn new(stores: Arc<Stores>, recent_orders: usize) -> Self {
        Self {
            stores,
            recent_orders,
        }
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, ServiceError> {
        let orders = self.stores.purchase_orders.orders();
        let metrics = DashboardMetrics {
            total_products: self.stores.products.count(),
            active_suppliers: self.stores.suppliers.count(),
            pending_orders: orders.count_where(|order| order.status.is_pending()),
            low_stock_items: self
                .stores
                .inventory
                .records()
                .count_where(|record| record.stock_status().needs_restock()),
        };

        let mut recent = newest_first(orders.list());
        recent.truncate(self.recent_orders);

        Ok(DashboardSnapshot {
            metrics,
            recent_orders: summaries(&self.stores, recent)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::fixture;
    use crate::commands::purchaseorders::{
        CreatePurchaseOrderCommand, NewLineItem, SubmitPurchaseOrderCommand,
    };
    use crate::commands::Command;
    use crate::models::InventoryRecord;
    use uuid::Uuid;

    #[tokio::test]
    async fn counts_pending_orders_and_low_stock() {
        let fx = fixture();
        for quantity in [8, 25, 100] {
            fx.stores
                .inventory
                .insert_unique(InventoryRecord::new(
                    fx.chips.id,
                    Uuid::new_v4(),
                    quantity,
                    30,
                    150,
                ))
                .unwrap();
        }
        for _ in 0..3 {
            let order = CreatePurchaseOrderCommand {
                supplier_id: Some(fx.supplier.id),
                expected_date: None,
                items: vec![NewLineItem {
                    product_id: fx.chips.id,
                    quantity: 10,
                    unit_price: None,
                }],
            }
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();
            if order.po_number != "PO-003" {
                SubmitPurchaseOrderCommand { id: order.id }
                    .execute(fx.stores.clone(), fx.events.clone())
                    .await
                    .unwrap();
            }
        }

        let snapshot = DashboardService::new(fx.stores.clone(), 2)
            .snapshot()
            .await
            .unwrap();

        assert_eq!(snapshot.metrics.total_products, 3);
        assert_eq!(snapshot.metrics.active_suppliers, 2);
        assert_eq!(snapshot.metrics.pending_orders, 2);
        assert_eq!(snapshot.metrics.low_stock_items, 2);
        let recent: Vec<_> = snapshot
            .recent_orders
            .iter()
            .map(|o| o.po_number.as_str())
            .collect();
        assert_eq!(recent, vec!["PO-003", "PO-002"]);
    }
}
