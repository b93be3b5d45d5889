mod common;

use axum::{
    body::{self, Body},
    http::Request,
};
use common::{id_of, response_json, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn dashboard_summarises_the_ledger() {
    let app = TestApp::new();
    let supplier = app.seed_supplier("Frito Lay").await;
    let chips = app
        .seed_product(&supplier, "Doritos Nacho", "SNK-001", "2.00")
        .await;
    let location = app.seed_location("Lobby Machine").await;
    app.create(
        "/api/v1/inventory",
        json!({
            "product_id": chips,
            "location_id": location,
            "quantity": 10,
            "min_quantity": 30,
            "max_quantity": 150,
        }),
    )
    .await;

    let mut ids = Vec::new();
    for _ in 0..6 {
        let order = app
            .create(
                "/api/v1/purchase-orders",
                json!({
                    "supplier_id": supplier,
                    "items": [{ "product_id": chips, "quantity": 24 }],
                }),
            )
            .await;
        ids.push(id_of(&order));
    }
    app.post(&format!("/api/v1/purchase-orders/{}/submit", ids[0]), json!({}))
        .await;

    let response = app.get("/api/v1/dashboard").await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    let metrics = &body["data"]["metrics"];
    assert_eq!(metrics["total_products"], 1);
    assert_eq!(metrics["active_suppliers"], 1);
    assert_eq!(metrics["pending_orders"], 1);
    assert_eq!(metrics["low_stock_items"], 1);

    let recent = body["data"]["recent_orders"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["po_number"], "PO-006");
}

#[tokio::test]
async fn health_and_status_report_state() {
    let app = TestApp::new();
    app.seed_supplier("Frito Lay").await;

    let health = response_json(app.get("/api/v1/health").await).await;
    assert_eq!(health["success"], true);
    assert_eq!(health["data"]["status"], "healthy");
    assert_eq!(health["data"]["records"]["suppliers"], 1);
    assert_eq!(health["data"]["checks"]["event_channel"], "open");

    let status = response_json(app.get("/api/v1/status").await).await;
    assert_eq!(status["data"]["service"], "orderflow-api");
    assert_eq!(status["data"]["environment"], "test");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new();
    let router = orderflow_api::app_router(app.state.clone());

    let request = Request::builder()
        .uri("/api/v1/status")
        .header("x-request-id", "req-from-client")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-from-client"
    );

    let response = app.get("/api/v1/status").await;
    assert!(response.headers().contains_key("x-request-id"));

    // Errors carry the same id in their body.
    let request = Request::builder()
        .uri("/api/v1/suppliers/00000000-0000-0000-0000-000000000001")
        .header("x-request-id", "req-missing-supplier")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), 404);
    let body = response_json(response).await;
    assert_eq!(body["request_id"], "req-missing-supplier");
}

#[tokio::test]
async fn metrics_expose_business_counters() {
    let app = TestApp::new();
    let supplier = app.seed_supplier("Frito Lay").await;
    app.create("/api/v1/purchase-orders", json!({ "supplier_id": supplier }))
        .await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), 200);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("orderflow_purchase_order_creations_total"));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = TestApp::new();
    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), 200);
    let doc = response_json(response).await;
    assert_eq!(doc["info"]["title"], "OrderFlow API");
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/purchase-orders/{id}/receive"));
    assert!(paths.contains_key("/api/v1/inventory/low-stock"));
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/suppliers")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = orderflow_api::app_router(app.state.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
