//! Domain records kept in the in-memory stores.

pub mod inventory;
pub mod location;
pub mod product;
pub mod purchase_order;
pub mod supplier;

use serde::Serialize;
use utoipa::ToSchema;

pub use inventory::{InventoryRecord, StockStatus};
pub use location::Location;
pub use product::Product;
pub use purchase_order::{LineItem, PaymentStatus, PurchaseOrder, PurchaseOrderStatus};
pub use supplier::Supplier;

/// Colour family a client should render a status badge with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Info,
    Warning,
    Success,
    Danger,
}

/// Display metadata for a status variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Descriptor {
    #[schema(value_type = String)]
    pub label: &'static str,
    pub tone: Tone,
}

impl Descriptor {
    pub const fn new(label: &'static str, tone: Tone) -> Self {
        Self { label, tone }
    }
}
