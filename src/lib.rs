//! OrderFlow API Library
//!
//! Purchase order, receiving and stock-level administration backed by
//! in-memory stores.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ledger;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

use crate::{events::EventSender, repositories::Stores};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub stores: Arc<Stores>,
    pub event_sender: Arc<EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        config: config::AppConfig,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(
            stores.clone(),
            event_sender.clone(),
            config.dashboard_recent_orders,
        );
        Self {
            config,
            stores,
            event_sender,
            services,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn metadata_omits_request_id_outside_a_request() {
        let response = ApiResponse::success(1);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["meta"].get("request_id").is_none());
    }
}

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        // Procurement
        .nest(
            "/purchase-orders",
            handlers::purchase_orders::purchase_orders_routes(),
        )
        // Stock
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest("/locations", handlers::inventory::locations_routes())
        // Reference data
        .nest("/products", handlers::products::products_routes())
        .nest("/suppliers", handlers::suppliers::suppliers_routes())
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
}

/// Full application router: service endpoints, the v1 API and the
/// cross-cutting layers, bound to `state`.
pub fn app_router(state: AppState) -> Router {
    let cors_layer = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let max_body_size = state.config.max_body_size;

    Router::<AppState>::new()
        .route("/", get(|| async { "orderflow-api up" }))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Apply compression, body limit and timeouts
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TimeoutLayer::new(timeout))
        // Apply CORS
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

/// Configured origins win; otherwise permissive CORS where allowed, and
/// same-origin only everywhere else.
fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    } else if config.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if config.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

async fn metrics_handler() -> Result<String, errors::ServiceError> {
    metrics::render().map_err(|err| {
        ::tracing::error!(error = %err, "Failed to render metrics");
        errors::ServiceError::InternalError(err.to_string())
    })
}

async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "orderflow-api",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let stores = &state.stores;
    let health_data = json!({
        "status": "healthy",
        "checks": {
            "event_channel": if state.event_sender.is_closed() { "closed" } else { "open" },
        },
        "records": {
            "products": stores.products.count(),
            "suppliers": stores.suppliers.count(),
            "locations": stores.locations.count(),
            "inventory": stores.inventory.records().count(),
            "purchase_orders": stores.purchase_orders.orders().count(),
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
