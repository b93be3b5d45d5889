#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use orderflow_api::{
    config::AppConfig,
    events::{self, EventSender},
    repositories::Stores,
    AppState,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for driving the full router against fresh in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub fn new() -> Self {
        let cfg = AppConfig {
            environment: "test".to_string(),
            dashboard_recent_orders: 5,
            ..AppConfig::default()
        };

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(cfg, Arc::new(Stores::new()), event_sender);
        let router = orderflow_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Posts and returns the `data` of a successful create.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let response = self.post(uri, body).await;
        assert_eq!(response.status(), 201, "create at {} failed", uri);
        response_json(response).await["data"].clone()
    }

    pub async fn seed_supplier(&self, name: &str) -> String {
        let supplier = self
            .create(
                "/api/v1/suppliers",
                json!({
                    "name": name,
                    "email": format!("orders@{}.example", name.to_lowercase().replace(' ', "-")),
                }),
            )
            .await;
        id_of(&supplier)
    }

    pub async fn seed_product(
        &self,
        supplier_id: &str,
        name: &str,
        sku: &str,
        price: &str,
    ) -> String {
        let product = self
            .create(
                "/api/v1/products",
                json!({
                    "name": name,
                    "sku": sku,
                    "supplier_id": supplier_id,
                    "price": price,
                    "category": "Snacks",
                }),
            )
            .await;
        id_of(&product)
    }

    pub async fn seed_location(&self, name: &str) -> String {
        let location = self
            .create("/api/v1/locations", json!({ "name": name }))
            .await;
        id_of(&location)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}
