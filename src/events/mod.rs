use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::PurchaseOrderStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// True once the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Sends an event after a mutation has already been stored. A closed
    /// channel is logged rather than surfaced to the caller.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "event dropped");
        }
    }
}

// Everything that can change in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // Purchase order events
    PurchaseOrderCreated(Uuid),
    PurchaseOrderUpdated(Uuid),
    PurchaseOrderSubmitted(Uuid),
    PurchaseOrderReceived {
        purchase_order_id: Uuid,
        previous_status: PurchaseOrderStatus,
        new_status: PurchaseOrderStatus,
        units_received: i64,
    },

    // Inventory events
    InventoryRecordCreated(Uuid),
    InventoryAdjusted {
        inventory_id: Uuid,
        product_id: Uuid,
        location_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
        reason: Option<String>,
    },
    LocationCreated(Uuid),

    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    SupplierCreated(Uuid),
    SupplierUpdated(Uuid),
}

// Drains the channel and logs each event until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::PurchaseOrderReceived {
                purchase_order_id,
                previous_status,
                new_status,
                units_received,
            } => {
                info!(
                    %purchase_order_id,
                    %previous_status,
                    %new_status,
                    units_received,
                    "purchase order received"
                );
                if new_status == PurchaseOrderStatus::Complete {
                    info!(%purchase_order_id, "purchase order fully received");
                }
            }
            Event::InventoryAdjusted {
                inventory_id,
                product_id,
                location_id,
                old_quantity,
                new_quantity,
                reason,
            } => {
                info!(
                    %inventory_id,
                    %product_id,
                    %location_id,
                    old_quantity,
                    new_quantity,
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "inventory adjusted"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::PurchaseOrderCreated(id)).await.unwrap();

        assert_eq!(rx.recv().await, Some(Event::PurchaseOrderCreated(id)));
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender.is_closed());
        assert!(sender.send(Event::LocationCreated(Uuid::new_v4())).await.is_err());
        // publish swallows the failure
        sender.publish(Event::LocationCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn processing_stops_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(process_events(rx));
        tx.send(Event::ProductCreated(Uuid::new_v4())).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }
}
