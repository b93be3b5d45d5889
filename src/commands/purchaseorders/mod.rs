pub mod add_line_item_command;
pub mod create_purchase_order_command;
pub mod receive_purchase_order_command;
pub mod remove_line_item_command;
pub mod submit_purchase_order_command;
pub mod update_line_item_command;
pub mod update_purchase_order_command;

// Re-export commands for easier access
pub use add_line_item_command::AddLineItemCommand;
pub use create_purchase_order_command::{CreatePurchaseOrderCommand, NewLineItem};
pub use receive_purchase_order_command::{ReceivePurchaseOrderCommand, ReceivedLine};
pub use remove_line_item_command::RemoveLineItemCommand;
pub use submit_purchase_order_command::SubmitPurchaseOrderCommand;
pub use update_line_item_command::UpdateLineItemCommand;
pub use update_purchase_order_command::UpdatePurchaseOrderCommand;

use tracing::warn;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    metrics::PO_COMMAND_FAILURES,
    models::{Product, PurchaseOrder},
    repositories::Stores,
};

/// Counts and logs a rejected purchase order command, passing the error through.
pub(crate) fn reject(command: &str, error: ServiceError) -> ServiceError {
    PO_COMMAND_FAILURES
        .with_label_values(&[command, error.kind()])
        .inc();
    warn!(command, error = %error, "purchase order command rejected");
    error
}

/// Runs `mutate` against one order under its entry lock. Nothing is stored
/// unless the closure succeeds.
pub(crate) fn update_order<R, F>(
    stores: &Stores,
    id: Uuid,
    mutate: F,
) -> Result<(PurchaseOrder, R), ServiceError>
where
    F: FnOnce(&mut PurchaseOrder) -> Result<R, ServiceError>,
{
    stores
        .purchase_orders
        .orders()
        .update(id, mutate)
        .ok_or_else(|| ServiceError::not_found("Purchase order", id))?
}

/// Looks up the product for a line item and checks it is sold by the order's
/// supplier.
pub(crate) fn resolve_line_product(
    stores: &Stores,
    supplier_id: Option<Uuid>,
    product_id: Uuid,
) -> Result<Product, ServiceError> {
    let supplier_id = supplier_id.ok_or_else(|| {
        ServiceError::ValidationError("Supplier required before adding line items".to_string())
    })?;
    let product = stores
        .products
        .get(product_id)
        .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

    if product.supplier_id != supplier_id {
        return Err(ServiceError::ValidationError(format!(
            "Product {} is not sold by supplier {}",
            product.sku, supplier_id
        )));
    }
    Ok(product)
}

pub(crate) fn ensure_editable(order: &PurchaseOrder) -> Result<(), ServiceError> {
    if order.status.is_editable() {
        Ok(())
    } else {
        Err(ServiceError::InvalidStatus(format!(
            "Purchase order {} is {} and can no longer be edited",
            order.po_number, order.status
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::{
        events::{Event, EventSender},
        models::{Product, Supplier},
        repositories::Stores,
    };

    pub struct Fixture {
        pub stores: Arc<Stores>,
        pub events: Arc<EventSender>,
        pub rx: mpsc::Receiver<Event>,
        pub supplier: Supplier,
        pub other_supplier: Supplier,
        pub chips: Product,
        pub salsa: Product,
        pub soda: Product,
    }

    fn make_supplier(name: &str) -> Supplier {
        Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("orders@{}.example", name.to_lowercase()),
            phone: None,
            address: None,
        }
    }

    fn make_product(name: &str, sku: &str, supplier_id: Uuid, price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sku: sku.to_string(),
            supplier_id,
            price,
            category: "Snacks".to_string(),
        }
    }

    pub fn fixture() -> Fixture {
        let stores = Arc::new(Stores::new());
        let (tx, rx) = mpsc::channel(64);
        let supplier = stores.suppliers.insert(make_supplier("Frito"));
        let other_supplier = stores.suppliers.insert(make_supplier("Fizz"));
        let chips = stores.products.insert(make_product(
            "Doritos Nacho",
            "SNK-001",
            supplier.id,
            Decimal::new(200, 2),
        ));
        let salsa = stores.products.insert(make_product(
            "Tostitos Salsa",
            "SNK-002",
            supplier.id,
            Decimal::new(225, 2),
        ));
        let soda = stores.products.insert(make_product(
            "Cola 12oz",
            "BEV-001",
            other_supplier.id,
            Decimal::new(150, 2),
        ));

        Fixture {
            stores,
            events: Arc::new(EventSender::new(tx)),
            rx,
            supplier,
            other_supplier,
            chips,
            salsa,
            soda,
        }
    }
}
