use crate::{
    commands::validate_unit_price,
    errors::ServiceError,
    events::{Event, EventSender},
    models::Product,
    repositories::Stores,
    services::procurement::{summaries, PurchaseOrderSummary},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    pub supplier_id: Uuid,
    #[validate(custom = "validate_unit_price")]
    pub price: Decimal,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
}

/// Partial product update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    pub supplier_id: Option<Uuid>,
    #[validate(custom = "validate_unit_price")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub supplier_id: Option<Uuid>,
    pub category: Option<String>,
    /// Case-insensitive match on name or SKU
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub purchase_orders: Vec<PurchaseOrderSummary>,
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Service for the product catalog
#[derive(Clone)]
pub struct CatalogService {
    stores: Arc<Stores>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(stores: Arc<Stores>, event_sender: Arc<EventSender>) -> Self {
        Self {
            stores,
            event_sender,
        }
    }

    fn view(&self, product: Product) -> ProductView {
        ProductView {
            supplier_name: self.stores.suppliers.get(product.supplier_id).map(|s| s.name),
            product,
        }
    }

    fn load(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.stores
            .products
            .get(id)
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    fn ensure_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        if self.stores.suppliers.contains(supplier_id) {
            Ok(())
        } else {
            Err(ServiceError::not_found("Supplier", supplier_id))
        }
    }

    fn ensure_unique_sku(&self, sku: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let taken = self.stores.products.count_where(|product| {
            Some(product.id) != except && product.sku.eq_ignore_ascii_case(sku)
        }) > 0;
        if taken {
            return Err(ServiceError::Conflict(format!("SKU {} is already in use", sku)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductView>, ServiceError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut products = self.stores.products.filter(|product| {
            filter
                .supplier_id
                .map_or(true, |id| product.supplier_id == id)
                && filter
                    .category
                    .as_deref()
                    .map_or(true, |category| product.category.eq_ignore_ascii_case(category))
                && search.map_or(true, |needle| product.matches_search(needle))
        });
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products.into_iter().map(|p| self.view(p)).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = self.load(id)?;
        let orders = self.stores.purchase_orders.find_by_product(id);
        Ok(ProductDetail {
            product: self.view(product),
            purchase_orders: summaries(&self.stores, orders)?,
        })
    }

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductView, ServiceError> {
        request.validate()?;
        let sku = required("SKU", &request.sku)?;
        let product = Product {
            id: Uuid::new_v4(),
            name: required("Product name", &request.name)?,
            category: required("Category", &request.category)?,
            supplier_id: request.supplier_id,
            price: request.price,
            sku,
        };
        self.ensure_supplier(product.supplier_id)?;
        self.ensure_unique_sku(&product.sku, None)?;

        let product = self.stores.products.insert(product);
        info!(product_id = %product.id, sku = %product.sku, "Product created");
        self.event_sender
            .publish(Event::ProductCreated(product.id))
            .await;
        Ok(self.view(product))
    }

    /// Applies a partial update. Moving a product to another supplier is
    /// refused once it appears on any purchase order.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductView, ServiceError> {
        request.validate()?;
        let current = self.load(id)?;

        let sku = request.sku.as_deref().map(|s| required("SKU", s)).transpose()?;
        let name = request
            .name
            .as_deref()
            .map(|s| required("Product name", s))
            .transpose()?;
        let category = request
            .category
            .as_deref()
            .map(|s| required("Category", s))
            .transpose()?;

        if let Some(sku) = &sku {
            self.ensure_unique_sku(sku, Some(id))?;
        }
        if let Some(supplier_id) = request.supplier_id.filter(|s| *s != current.supplier_id) {
            self.ensure_supplier(supplier_id)?;
            if !self.stores.purchase_orders.find_by_product(id).is_empty() {
                warn!(product_id = %id, "Refusing supplier change for ordered product");
                return Err(ServiceError::Conflict(format!(
                    "Product {} appears on purchase orders and cannot change supplier",
                    current.sku
                )));
            }
        }

        let (product, _) = self
            .stores
            .products
            .update(id, |product| {
                if let Some(name) = name {
                    product.name = name;
                }
                if let Some(sku) = sku {
                    product.sku = sku;
                }
                if let Some(category) = category {
                    product.category = category;
                }
                if let Some(price) = request.price {
                    product.price = price;
                }
                if let Some(supplier_id) = request.supplier_id {
                    product.supplier_id = supplier_id;
                }
                Ok::<_, ServiceError>(())
            })
            .ok_or_else(|| ServiceError::not_found("Product", id))??;

        info!(product_id = %id, "Product updated");
        self.event_sender.publish(Event::ProductUpdated(id)).await;
        Ok(self.view(product))
    }

    /// Orders containing the product, newest first
    #[instrument(skip(self))]
    pub async fn product_purchase_orders(
        &self,
        id: Uuid,
    ) -> Result<Vec<PurchaseOrderSummary>, ServiceError> {
        self.load(id)?;
        let orders = self.stores.purchase_orders.find_by_product(id);
        summaries(&self.stores, orders)
    }
}
