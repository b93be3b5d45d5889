use crate::{
    commands::inventory::{
        AdjustInventoryCommand, AdjustInventoryResult, CreateInventoryRecordCommand,
    },
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Descriptor, InventoryRecord, Location, StockStatus},
    repositories::Stores,
    services::procurement::{summaries, PurchaseOrderSummary},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// An inventory record joined with its product and location names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub location_id: Uuid,
    pub location_name: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub max_quantity: i32,
    pub stock_status: StockStatus,
    pub stock_status_descriptor: Descriptor,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryDetail {
    #[serde(flatten)]
    pub row: InventoryRow,
    pub fill_percentage: Decimal,
    /// Orders containing the product, newest first.
    pub purchase_orders: Vec<PurchaseOrderSummary>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryFilter {
    pub location_id: Option<Uuid>,
    /// Case-insensitive match on product name or SKU
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 200, message = "Location name is required"))]
    pub name: String,
}

/// Service for stock levels and the locations they are held at
#[derive(Clone)]
pub struct InventoryService {
    stores: Arc<Stores>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(stores: Arc<Stores>, event_sender: Arc<EventSender>) -> Self {
        Self {
            stores,
            event_sender,
        }
    }

    fn row(&self, record: &InventoryRecord) -> InventoryRow {
        let product = self.stores.products.get(record.product_id);
        let status = record.stock_status();
        InventoryRow {
            id: record.id,
            product_id: record.product_id,
            product_name: product.as_ref().map(|p| p.name.clone()),
            sku: product.map(|p| p.sku),
            location_id: record.location_id,
            location_name: self.stores.locations.get(record.location_id).map(|l| l.name),
            quantity: record.quantity,
            min_quantity: record.min_quantity,
            max_quantity: record.max_quantity,
            stock_status: status,
            stock_status_descriptor: status.descriptor(),
        }
    }

    fn rows(&self, records: Vec<InventoryRecord>) -> Vec<InventoryRow> {
        let mut rows: Vec<InventoryRow> = records.iter().map(|r| self.row(r)).collect();
        rows.sort_by(|a, b| {
            a.product_name
                .cmp(&b.product_name)
                .then_with(|| a.location_name.cmp(&b.location_name))
        });
        rows
    }

    /// Lists stock rows filtered by location and product name/SKU search
    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        filter: InventoryFilter,
    ) -> Result<Vec<InventoryRow>, ServiceError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let records = self.stores.inventory.records().filter(|record| {
            if filter
                .location_id
                .map_or(false, |id| record.location_id != id)
            {
                return false;
            }
            match search {
                None => true,
                Some(needle) => self
                    .stores
                    .products
                    .get(record.product_id)
                    .map_or(false, |product| product.matches_search(needle)),
            }
        });
        Ok(self.rows(records))
    }

    #[instrument(skip(self))]
    pub async fn get_inventory(&self, id: Uuid) -> Result<InventoryDetail, ServiceError> {
        let record = self
            .stores
            .inventory
            .records()
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Inventory record", id))?;

        let orders = self
            .stores
            .purchase_orders
            .find_by_product(record.product_id);

        Ok(InventoryDetail {
            fill_percentage: record.fill_percentage(),
            purchase_orders: summaries(&self.stores, orders)?,
            row: self.row(&record),
        })
    }

    /// Applies a signed manual adjustment to one record
    #[instrument(skip(self))]
    pub async fn adjust_inventory(
        &self,
        command: AdjustInventoryCommand,
    ) -> Result<AdjustInventoryResult, ServiceError> {
        command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await
    }

    /// Records at or below their minimum, most urgent first
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let records = self
            .stores
            .inventory
            .records()
            .filter(|record| record.stock_status().needs_restock());
        let mut rows = self.rows(records);
        rows.sort_by_key(|row| row.stock_status != StockStatus::Critical);
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn create_inventory_record(
        &self,
        command: CreateInventoryRecordCommand,
    ) -> Result<InventoryRow, ServiceError> {
        let record = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        Ok(self.row(&record))
    }

    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<Location>, ServiceError> {
        let mut locations = self.stores.locations.list();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    #[instrument(skip(self))]
    pub async fn create_location(
        &self,
        request: CreateLocationRequest,
    ) -> Result<Location, ServiceError> {
        request.validate()?;
        if request.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Location name is required".to_string(),
            ));
        }
        let location = self.stores.locations.insert(Location {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
        });
        info!(location_id = %location.id, "Location created");
        self.event_sender
            .publish(Event::LocationCreated(location.id))
            .await;
        Ok(location)
    }
}
