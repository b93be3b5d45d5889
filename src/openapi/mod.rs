use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OrderFlow API",
        version = "0.1.0",
        description = r#"
# OrderFlow Purchasing and Inventory API

Back office API for a small vending and snack distribution business.

## Features

- **Purchase Orders**: Draft, submit and receive orders against suppliers
- **Receiving**: Partial deliveries are clamped to what is still outstanding
- **Inventory**: Stock levels per location with Critical/Low/OK/Overstocked status
- **Catalog**: Products and the suppliers that sell them
- **Dashboard**: Headline counts and the most recent orders

## Error Handling

Every error uses the same body with the request id echoed back:

```json
{
  "error": "Conflict",
  "message": "Invalid status: Purchase order PO-001 is draft and cannot receive goods",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "purchase-orders", description = "Purchase order lifecycle and receiving"),
        (name = "inventory", description = "Stock levels, adjustments and locations"),
        (name = "products", description = "Product catalog"),
        (name = "suppliers", description = "Supplier directory"),
        (name = "dashboard", description = "Overview metrics")
    ),
    paths(
        // Purchase orders
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::add_line_item,
        crate::handlers::purchase_orders::update_line_item,
        crate::handlers::purchase_orders::remove_line_item,
        crate::handlers::purchase_orders::submit_purchase_order,
        crate::handlers::purchase_orders::receive_purchase_order,
        crate::handlers::purchase_orders::receiving_worksheet,

        // Inventory
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::create_inventory_record,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::adjust_inventory,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::list_locations,
        crate::handlers::inventory::create_location,

        // Catalog
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::product_purchase_orders,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::supplier_purchase_orders,

        // Dashboard
        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // Domain records
            crate::models::PurchaseOrderStatus,
            crate::models::PaymentStatus,
            crate::models::StockStatus,
            crate::models::Descriptor,
            crate::models::Tone,
            crate::ledger::OrderTotals,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
