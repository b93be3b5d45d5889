use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::PurchaseOrder,
    repositories::Stores,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ensure_editable, reject, update_order};

const COMMAND: &str = "remove_line_item";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveLineItemCommand {
    pub purchase_order_id: Uuid,
    pub line_item_id: Uuid,
}

#[async_trait::async_trait]
impl Command for RemoveLineItemCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, stores, event_sender), fields(purchase_order_id = %self.purchase_order_id, line_item_id = %self.line_item_id))]
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let (order, _) = update_order(&stores, self.purchase_order_id, |order| {
            ensure_editable(order)?;
            let before = order.line_items.len();
            order.line_items.retain(|item| item.id != self.line_item_id);
            if order.line_items.len() == before {
                return Err(ServiceError::not_found("Line item", self.line_item_id));
            }
            Ok(())
        })
        .map_err(|e| reject(COMMAND, e))?;

        info!("Line item removed");
        event_sender
            .publish(Event::PurchaseOrderUpdated(order.id))
            .await;

        Ok(order)
    }
}
