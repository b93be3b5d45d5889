pub mod common;
pub mod dashboard;
pub mod inventory;
pub mod products;
pub mod purchase_orders;
pub mod suppliers;

use crate::events::EventSender;
use crate::repositories::Stores;
use crate::services::{
    catalog::CatalogService, dashboard::DashboardService, inventory::InventoryService,
    procurement::ProcurementService, suppliers::SupplierService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub procurement: Arc<ProcurementService>,
    pub inventory: Arc<InventoryService>,
    pub catalog: Arc<CatalogService>,
    pub suppliers: Arc<SupplierService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Wires every service against the shared stores and event channel.
    pub fn new(
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
        dashboard_recent_orders: usize,
    ) -> Self {
        Self {
            procurement: Arc::new(ProcurementService::new(
                stores.clone(),
                event_sender.clone(),
            )),
            inventory: Arc::new(InventoryService::new(stores.clone(), event_sender.clone())),
            catalog: Arc::new(CatalogService::new(stores.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(stores.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(stores, dashboard_recent_orders)),
        }
    }
}
