use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState, services::dashboard::DashboardSnapshot};
use axum::{extract::State, response::IntoResponse};

/// Headline metrics and the most recent purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard snapshot", body = crate::ApiResponse<DashboardSnapshot>)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .services
        .dashboard
        .snapshot()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(snapshot))
}
