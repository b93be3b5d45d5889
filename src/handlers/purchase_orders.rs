use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    commands::purchaseorders::{
        AddLineItemCommand, CreatePurchaseOrderCommand, ReceivePurchaseOrderCommand,
        RemoveLineItemCommand, UpdateLineItemCommand, UpdatePurchaseOrderCommand,
    },
    errors::ApiError,
    handlers::AppState,
    services::procurement::{
        PurchaseOrderFilter, PurchaseOrderSummary, PurchaseOrderView, ReceiveResponse,
        ReceivingWorksheet,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Creates the router for purchase order endpoints
pub fn purchase_orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route("/:id", get(get_purchase_order).put(update_purchase_order))
        .route("/:id/items", post(add_line_item))
        .route(
            "/:id/items/:line_item_id",
            put(update_line_item).delete(remove_line_item),
        )
        .route("/:id/submit", post(submit_purchase_order))
        .route("/:id/receive", post(receive_purchase_order))
        .route("/:id/receiving", get(receiving_worksheet))
}

/// Create a new draft purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderCommand,
    responses(
        (status = 201, description = "Purchase order created", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .procurement
        .create_purchase_order(payload)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", order.po_number);
    Ok(created_response(order))
}

/// List purchase orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PurchaseOrderFilter),
    responses(
        (status = 200, description = "Purchase orders listed", body = crate::ApiResponse<Vec<PurchaseOrderSummary>>)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .procurement
        .list_purchase_orders(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order fetched", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .procurement
        .get_purchase_order(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Update supplier, expected date or payment status
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    request_body = UpdatePurchaseOrderCommand,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order updated", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is past the editable stage", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdatePurchaseOrderCommand { id, ..payload };

    let order = state
        .services
        .procurement
        .update_purchase_order(command)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Add a line item to a draft order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/items",
    request_body = AddLineItemCommand,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 201, description = "Line item added", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Invalid line item", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order or product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not a draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn add_line_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddLineItemCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let command = AddLineItemCommand {
        purchase_order_id: id,
        ..payload
    };

    let order = state
        .services
        .procurement
        .add_line_item(command)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}

/// Change a draft line's product, quantity or unit price
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}/items/{line_item_id}",
    request_body = UpdateLineItemCommand,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID"),
        ("line_item_id" = Uuid, Path, description = "Line item ID")
    ),
    responses(
        (status = 200, description = "Line item updated", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Invalid line item", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order or line item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not a draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateLineItemCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let command = UpdateLineItemCommand {
        purchase_order_id: id,
        line_item_id,
        ..payload
    };

    let order = state
        .services
        .procurement
        .update_line_item(command)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Remove a line from a draft order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}/items/{line_item_id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID"),
        ("line_item_id" = Uuid, Path, description = "Line item ID")
    ),
    responses(
        (status = 200, description = "Line item removed", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 404, description = "Purchase order or line item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not a draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn remove_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .procurement
        .remove_line_item(RemoveLineItemCommand {
            purchase_order_id: id,
            line_item_id,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Submit a draft order to its supplier
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order submitted", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Supplier or line items missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not a draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn submit_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .procurement
        .submit_purchase_order(id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order submitted: {}", order.po_number);
    Ok(success_response(order))
}

/// Record goods received against an order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/receive",
    request_body = ReceivePurchaseOrderCommand,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Receipt recorded", body = crate::ApiResponse<ReceiveResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order or line item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not receivable", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceivePurchaseOrderCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let command = ReceivePurchaseOrderCommand { id, ..payload };

    let received = state
        .services
        .procurement
        .receive_purchase_order(command)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(received))
}

/// Receiving worksheet: ordered, received and remaining per line
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/receiving",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Receiving worksheet", body = crate::ApiResponse<ReceivingWorksheet>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn receiving_worksheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let worksheet = state
        .services
        .procurement
        .receiving_worksheet(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(worksheet))
}
