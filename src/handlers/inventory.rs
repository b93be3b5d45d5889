use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    commands::inventory::{
        AdjustInventoryCommand, AdjustInventoryResult, CreateInventoryRecordCommand,
    },
    errors::ApiError,
    handlers::AppState,
    models::Location,
    services::inventory::{
        CreateLocationRequest, InventoryDetail, InventoryFilter, InventoryRow,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Creates the router for inventory endpoints
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory_record))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_inventory))
        .route("/:id/adjust", post(adjust_inventory))
}

/// Creates the router for location endpoints
pub fn locations_routes() -> Router<AppState> {
    Router::new().route("/", get(list_locations).post(create_location))
}

/// List inventory rows with their stock status
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryFilter),
    responses(
        (status = 200, description = "Inventory listed", body = crate::ApiResponse<Vec<InventoryRow>>)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .inventory
        .list_inventory(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rows))
}

/// Start tracking a product at a location
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryRecordCommand,
    responses(
        (status = 201, description = "Inventory record created", body = crate::ApiResponse<InventoryRow>),
        (status = 400, description = "Invalid stock levels", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product already stocked at location", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory_record(
    State(state): State<AppState>,
    Json(payload): Json<CreateInventoryRecordCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let row = state
        .services
        .inventory
        .create_inventory_record(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(row))
}

/// Inventory detail with fill percentage and purchase order history
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(
        ("id" = Uuid, Path, description = "Inventory record ID")
    ),
    responses(
        (status = 200, description = "Inventory record fetched", body = crate::ApiResponse<InventoryDetail>),
        (status = 404, description = "Inventory record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .inventory
        .get_inventory(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

/// Adjust a record's quantity by a signed delta
#[utoipa::path(
    post,
    path = "/api/v1/inventory/{id}/adjust",
    request_body = AdjustInventoryCommand,
    params(
        ("id" = Uuid, Path, description = "Inventory record ID")
    ),
    responses(
        (status = 200, description = "Inventory adjusted", body = crate::ApiResponse<AdjustInventoryResult>),
        (status = 400, description = "Adjustment would make stock negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustInventoryCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let command = AdjustInventoryCommand {
        inventory_id: id,
        ..payload
    };

    let result = state
        .services
        .inventory
        .adjust_inventory(command)
        .await
        .map_err(map_service_error)?;

    info!(
        "Inventory {} adjusted from {} to {}",
        id, result.previous_quantity, result.new_quantity
    );
    Ok(success_response(result))
}

/// Records classified Critical or Low
#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses(
        (status = 200, description = "Low stock records", body = crate::ApiResponse<Vec<InventoryRow>>)
    ),
    tag = "inventory"
)]
pub async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .inventory
        .low_stock()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rows))
}

/// List stock locations
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Locations listed", body = crate::ApiResponse<Vec<Location>>)
    ),
    tag = "inventory"
)]
pub async fn list_locations(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let locations = state
        .services
        .inventory
        .list_locations()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(locations))
}

/// Create a stock location
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = crate::ApiResponse<Location>),
        (status = 400, description = "Name missing", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let location = state
        .services
        .inventory
        .create_location(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(location))
}
