use crate::{
    commands::purchaseorders::{
        AddLineItemCommand, CreatePurchaseOrderCommand, ReceivePurchaseOrderCommand,
        RemoveLineItemCommand, SubmitPurchaseOrderCommand, UpdateLineItemCommand,
        UpdatePurchaseOrderCommand,
    },
    commands::Command,
    errors::ServiceError,
    events::EventSender,
    ledger::{receiving, OrderTotals, ReceiptOutcome, ReceivingSummary},
    models::{Descriptor, LineItem, PaymentStatus, PurchaseOrder, PurchaseOrderStatus},
    repositories::{newest_first, Stores},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Purchase order with resolved names, derived flags and display totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOrderView {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub status: PurchaseOrderStatus,
    pub status_descriptor: Descriptor,
    pub payment_status: PaymentStatus,
    pub payment_status_descriptor: Descriptor,
    pub created_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub is_editable: bool,
    pub can_receive: bool,
    pub line_items: Vec<LineItemView>,
    pub totals: OrderTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub quantity_received: i32,
    pub remaining: i32,
    pub line_total: Decimal,
}

/// One row of an order list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOrderSummary {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub status: PurchaseOrderStatus,
    pub status_descriptor: Descriptor,
    pub payment_status: PaymentStatus,
    pub payment_status_descriptor: Descriptor,
    pub created_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub line_count: usize,
    pub total: Decimal,
}

/// Everything needed to record a delivery against an order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceivingWorksheet {
    pub purchase_order_id: Uuid,
    pub po_number: String,
    pub status: PurchaseOrderStatus,
    pub status_descriptor: Descriptor,
    pub can_receive: bool,
    pub lines: Vec<WorksheetLine>,
    pub summary: ReceivingSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorksheetLine {
    pub line_item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub ordered: i32,
    pub received: i32,
    pub remaining: i32,
    /// False once the line is fully received.
    pub receivable: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceiveResponse {
    pub order: PurchaseOrderView,
    pub outcome: ReceiptOutcome,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PurchaseOrderFilter {
    pub supplier_id: Option<Uuid>,
    pub status: Option<PurchaseOrderStatus>,
}

pub fn order_view(
    stores: &Stores,
    order: &PurchaseOrder,
) -> Result<PurchaseOrderView, ServiceError> {
    let line_items = order
        .line_items
        .iter()
        .map(|item| line_item_view(stores, item))
        .collect::<Result<Vec<_>, ServiceError>>()?;
    Ok(PurchaseOrderView {
        id: order.id,
        po_number: order.po_number.clone(),
        supplier_id: order.supplier_id,
        supplier_name: supplier_name(stores, order.supplier_id),
        status: order.status,
        status_descriptor: order.status.descriptor(),
        payment_status: order.payment_status,
        payment_status_descriptor: order.payment_status.descriptor(),
        created_date: order.created_date,
        expected_date: order.expected_date,
        is_editable: order.status.is_editable(),
        can_receive: order.status.can_receive(),
        line_items,
        totals: order.totals()?.for_display(),
    })
}

fn line_item_view(stores: &Stores, item: &LineItem) -> Result<LineItemView, ServiceError> {
    let product = stores.products.get(item.product_id);
    Ok(LineItemView {
        id: item.id,
        product_id: item.product_id,
        product_name: product.as_ref().map(|p| p.name.clone()),
        sku: product.map(|p| p.sku),
        quantity: item.quantity,
        unit_price: item.unit_price,
        quantity_received: item.quantity_received,
        remaining: item.remaining(),
        line_total: item.line_total()?,
    })
}

pub fn order_summary(
    stores: &Stores,
    order: &PurchaseOrder,
) -> Result<PurchaseOrderSummary, ServiceError> {
    Ok(PurchaseOrderSummary {
        id: order.id,
        po_number: order.po_number.clone(),
        supplier_id: order.supplier_id,
        supplier_name: supplier_name(stores, order.supplier_id),
        status: order.status,
        status_descriptor: order.status.descriptor(),
        payment_status: order.payment_status,
        payment_status_descriptor: order.payment_status.descriptor(),
        created_date: order.created_date,
        expected_date: order.expected_date,
        line_count: order.line_items.len(),
        total: order.totals()?.for_display().total,
    })
}

pub fn summaries(
    stores: &Stores,
    orders: Vec<PurchaseOrder>,
) -> Result<Vec<PurchaseOrderSummary>, ServiceError> {
    orders
        .iter()
        .map(|order| order_summary(stores, order))
        .collect()
}

fn supplier_name(stores: &Stores, supplier_id: Option<Uuid>) -> Option<String> {
    supplier_id
        .and_then(|id| stores.suppliers.get(id))
        .map(|supplier| supplier.name)
}

/// Service for managing the purchase order lifecycle
#[derive(Clone)]
pub struct ProcurementService {
    stores: Arc<Stores>,
    event_sender: Arc<EventSender>,
}

impl ProcurementService {
    /// Creates a new procurement service instance
    pub fn new(stores: Arc<Stores>, event_sender: Arc<EventSender>) -> Self {
        Self {
            stores,
            event_sender,
        }
    }

    fn view(&self, order: &PurchaseOrder) -> Result<PurchaseOrderView, ServiceError> {
        order_view(&self.stores, order)
    }

    /// Creates a new draft purchase order
    #[instrument(skip(self))]
    pub async fn create_purchase_order(
        &self,
        command: CreatePurchaseOrderCommand,
    ) -> Result<PurchaseOrderView, ServiceError> {
        let order = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    /// Lists orders newest first, optionally narrowed by supplier and status
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        filter: PurchaseOrderFilter,
    ) -> Result<Vec<PurchaseOrderSummary>, ServiceError> {
        let orders = self.stores.purchase_orders.orders().filter(|order| {
            filter
                .supplier_id
                .map_or(true, |id| order.supplier_id == Some(id))
                && filter.status.map_or(true, |status| order.status == status)
        });
        summaries(&self.stores, newest_first(orders))
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_order(&self, id: Uuid) -> Result<PurchaseOrderView, ServiceError> {
        let order = self.load(id)?;
        self.view(&order)
    }

    /// Updates supplier, expected date or payment status
    #[instrument(skip(self))]
    pub async fn update_purchase_order(
        &self,
        command: UpdatePurchaseOrderCommand,
    ) -> Result<PurchaseOrderView, ServiceError> {
        let order = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    #[instrument(skip(self))]
    pub async fn add_line_item(
        &self,
        command: AddLineItemCommand,
    ) -> Result<PurchaseOrderView, ServiceError> {
        let (order, _) = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    #[instrument(skip(self))]
    pub async fn update_line_item(
        &self,
        command: UpdateLineItemCommand,
    ) -> Result<PurchaseOrderView, ServiceError> {
        let order = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    #[instrument(skip(self))]
    pub async fn remove_line_item(
        &self,
        command: RemoveLineItemCommand,
    ) -> Result<PurchaseOrderView, ServiceError> {
        let order = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    /// Submits a draft to its supplier
    #[instrument(skip(self))]
    pub async fn submit_purchase_order(&self, id: Uuid) -> Result<PurchaseOrderView, ServiceError> {
        let order = SubmitPurchaseOrderCommand { id }
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        self.view(&order)
    }

    /// Records a delivery and returns the order with its derived status
    #[instrument(skip(self))]
    pub async fn receive_purchase_order(
        &self,
        command: ReceivePurchaseOrderCommand,
    ) -> Result<ReceiveResponse, ServiceError> {
        let result = command
            .execute(self.stores.clone(), self.event_sender.clone())
            .await?;
        Ok(ReceiveResponse {
            order: self.view(&result.order)?,
            outcome: result.outcome,
        })
    }

    #[instrument(skip(self))]
    pub async fn receiving_worksheet(&self, id: Uuid) -> Result<ReceivingWorksheet, ServiceError> {
        let order = self.load(id)?;
        let lines = order
            .line_items
            .iter()
            .map(|item| {
                let product = self.stores.products.get(item.product_id);
                WorksheetLine {
                    line_item_id: item.id,
                    product_id: item.product_id,
                    product_name: product.as_ref().map(|p| p.name.clone()),
                    sku: product.map(|p| p.sku),
                    ordered: item.quantity,
                    received: item.quantity_received,
                    remaining: item.remaining(),
                    receivable: order.status.can_receive() && item.remaining() > 0,
                }
            })
            .collect();

        Ok(ReceivingWorksheet {
            purchase_order_id: order.id,
            po_number: order.po_number.clone(),
            status: order.status,
            status_descriptor: order.status.descriptor(),
            can_receive: order.status.can_receive(),
            lines,
            summary: receiving::summarize(&order.line_items),
        })
    }

    fn load(&self, id: Uuid) -> Result<PurchaseOrder, ServiceError> {
        self.stores
            .purchase_orders
            .orders()
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))
    }
}
