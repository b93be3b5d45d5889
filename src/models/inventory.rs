use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Descriptor, Tone};
use crate::ledger::stock;

/// Stock held for one product at one location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub min_quantity: i32,
    pub max_quantity: i32,
}

impl InventoryRecord {
    pub fn new(
        product_id: Uuid,
        location_id: Uuid,
        quantity: i32,
        min_quantity: i32,
        max_quantity: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            location_id,
            quantity,
            min_quantity,
            max_quantity,
        }
    }

    pub fn stock_status(&self) -> StockStatus {
        stock::classify(self)
    }

    /// How full the slot is relative to `max_quantity`, capped at 100.
    pub fn fill_percentage(&self) -> Decimal {
        stock::fill_percentage(self.quantity, self.max_quantity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Critical,
    Low,
    Ok,
    Overstocked,
}

impl StockStatus {
    pub fn descriptor(&self) -> Descriptor {
        match self {
            Self::Critical => Descriptor::new("Critical", Tone::Danger),
            Self::Low => Descriptor::new("Low", Tone::Warning),
            Self::Ok => Descriptor::new("OK", Tone::Success),
            Self::Overstocked => Descriptor::new("Overstocked", Tone::Info),
        }
    }

    /// Below the configured minimum and due for a refill.
    pub fn needs_restock(&self) -> bool {
        matches!(self, Self::Critical | Self::Low)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().label)
    }
}
