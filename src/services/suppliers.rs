use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::Supplier,
    repositories::Stores,
    services::procurement::{summaries, PurchaseOrderSummary},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 200, message = "Supplier name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierFilter {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierView {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub product_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierDetail {
    #[serde(flatten)]
    pub supplier: SupplierView,
    pub purchase_orders: Vec<PurchaseOrderSummary>,
}

/// Blank optional contact fields are stored as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Service for the supplier directory
#[derive(Clone)]
pub struct SupplierService {
    stores: Arc<Stores>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    pub fn new(stores: Arc<Stores>, event_sender: Arc<EventSender>) -> Self {
        Self {
            stores,
            event_sender,
        }
    }

    fn view(&self, supplier: Supplier) -> SupplierView {
        SupplierView {
            product_count: self
                .stores
                .products
                .count_where(|product| product.supplier_id == supplier.id),
            supplier,
        }
    }

    fn load(&self, id: Uuid) -> Result<Supplier, ServiceError> {
        self.stores
            .suppliers
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Supplier", id))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        filter: SupplierFilter,
    ) -> Result<Vec<SupplierView>, ServiceError> {
        let needle = filter
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut suppliers = self.stores.suppliers.filter(|supplier| match &needle {
            None => true,
            Some(needle) => {
                supplier.name.to_lowercase().contains(needle)
                    || supplier.email.to_lowercase().contains(needle)
            }
        });
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers.into_iter().map(|s| self.view(s)).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: Uuid) -> Result<SupplierDetail, ServiceError> {
        let supplier = self.load(id)?;
        let orders = self.stores.purchase_orders.find_by_supplier(id);
        Ok(SupplierDetail {
            supplier: self.view(supplier),
            purchase_orders: summaries(&self.stores, orders)?,
        })
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierRequest,
    ) -> Result<SupplierView, ServiceError> {
        request.validate()?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Supplier name is required".to_string(),
            ));
        }

        let supplier = self.stores.suppliers.insert(Supplier {
            id: Uuid::new_v4(),
            name,
            email: request.email.trim().to_string(),
            phone: optional(request.phone),
            address: optional(request.address),
        });
        info!(supplier_id = %supplier.id, "Supplier created");
        self.event_sender
            .publish(Event::SupplierCreated(supplier.id))
            .await;
        Ok(self.view(supplier))
    }

    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<SupplierView, ServiceError> {
        request.validate()?;
        let name = request.name.map(|n| n.trim().to_string());
        if name.as_deref() == Some("") {
            return Err(ServiceError::ValidationError(
                "Supplier name is required".to_string(),
            ));
        }

        let (supplier, _) = self
            .stores
            .suppliers
            .update(id, |supplier| {
                if let Some(name) = name {
                    supplier.name = name;
                }
                if let Some(email) = request.email {
                    supplier.email = email.trim().to_string();
                }
                if request.phone.is_some() {
                    supplier.phone = optional(request.phone);
                }
                if request.address.is_some() {
                    supplier.address = optional(request.address);
                }
                Ok::<_, ServiceError>(())
            })
            .ok_or_else(|| ServiceError::not_found("Supplier", id))??;

        info!(supplier_id = %id, "Supplier updated");
        self.event_sender.publish(Event::SupplierUpdated(id)).await;
        Ok(self.view(supplier))
    }

    /// The supplier's orders, newest first
    #[instrument(skip(self))]
    pub async fn supplier_purchase_orders(
        &self,
        id: Uuid,
    ) -> Result<Vec<PurchaseOrderSummary>, ServiceError> {
        self.load(id)?;
        let orders = self.stores.purchase_orders.find_by_supplier(id);
        summaries(&self.stores, orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::test_support::fixture;
    use crate::commands::purchaseorders::CreatePurchaseOrderCommand;
    use crate::commands::Command;
    use assert_matches::assert_matches;

    fn request(email: &str) -> CreateSupplierRequest {
        CreateSupplierRequest {
            name: "Hostess Brands".into(),
            email: email.into(),
            phone: Some("  ".into()),
            address: None,
        }
    }

    #[tokio::test]
    async fn email_must_be_valid() {
        let fx = fixture();
        let service = SupplierService::new(fx.stores.clone(), fx.events.clone());

        let invalid = service.create_supplier(request("not-an-email")).await;
        assert_matches!(invalid, Err(ServiceError::ValidationError(_)));

        let created = service
            .create_supplier(request("orders@hostess.example"))
            .await
            .unwrap();
        assert_eq!(created.supplier.phone, None);
        assert_eq!(created.product_count, 0);
    }

    #[tokio::test]
    async fn detail_lists_product_count_and_orders() {
        let fx = fixture();
        let service = SupplierService::new(fx.stores.clone(), fx.events.clone());
        for _ in 0..2 {
            CreatePurchaseOrderCommand {
                supplier_id: Some(fx.supplier.id),
                ..Default::default()
            }
            .execute(fx.stores.clone(), fx.events.clone())
            .await
            .unwrap();
        }

        let detail = service.get_supplier(fx.supplier.id).await.unwrap();
        assert_eq!(detail.supplier.product_count, 2);
        let numbers: Vec<_> = detail
            .purchase_orders
            .iter()
            .map(|o| o.po_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["PO-002", "PO-001"]);

        let other = service
            .supplier_purchase_orders(fx.other_supplier.id)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_unspecified_fields() {
        let fx = fixture();
        let service = SupplierService::new(fx.stores.clone(), fx.events.clone());
        let updated = service
            .update_supplier(
                fx.supplier.id,
                UpdateSupplierRequest {
                    phone: Some("555-0100".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.supplier.name, "Frito");
        assert_eq!(updated.supplier.phone.as_deref(), Some("555-0100"));

        let missing = service
            .update_supplier(Uuid::new_v4(), UpdateSupplierRequest::default())
            .await;
        assert_matches!(missing, Err(ServiceError::NotFound(_)));
    }
}
