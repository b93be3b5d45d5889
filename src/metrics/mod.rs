//! Business counters exported in the Prometheus text format at `/metrics`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new_custom(Some("orderflow".into()), None)
        .expect("registry can be created");
    pub static ref PO_CREATIONS: IntCounter = register(IntCounter::new(
        "purchase_order_creations_total",
        "Total number of purchase orders created"
    ));
    pub static ref PO_SUBMISSIONS: IntCounter = register(IntCounter::new(
        "purchase_order_submissions_total",
        "Total number of purchase orders submitted"
    ));
    pub static ref PO_RECEIPTS: IntCounter = register(IntCounter::new(
        "purchase_order_receipts_total",
        "Total number of receiving actions recorded"
    ));
    pub static ref PO_UNITS_RECEIVED: IntCounter = register(IntCounter::new(
        "purchase_order_units_received_total",
        "Total number of units received against purchase orders"
    ));
    pub static ref PO_COMMAND_FAILURES: IntCounterVec = register(IntCounterVec::new(
        Opts::new(
            "purchase_order_command_failures_total",
            "Total number of rejected purchase order commands"
        ),
        &["command", "error_type"]
    ));
    pub static ref INVENTORY_ADJUSTMENTS: IntCounter = register(IntCounter::new(
        "inventory_adjustments_total",
        "Total number of inventory adjustments"
    ));
    pub static ref INVENTORY_ADJUSTMENT_FAILURES: IntCounterVec = register(IntCounterVec::new(
        Opts::new(
            "inventory_adjustment_failures_total",
            "Total number of failed inventory adjustments"
        ),
        &["error_type"]
    ));
}

fn register<C>(collector: prometheus::Result<C>) -> C
where
    C: prometheus::core::Collector + Clone + 'static,
{
    let collector = collector.expect("metric can be created");
    REGISTRY
        .register(Box::new(collector.clone()))
        .expect("metric can be registered");
    collector
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

/// Renders every registered counter in the Prometheus text format.
pub fn render() -> Result<String, MetricsError> {
    // Touch each lazy static so counters appear even before first use.
    let _ = (
        &*PO_CREATIONS,
        &*PO_SUBMISSIONS,
        &*PO_RECEIPTS,
        &*PO_UNITS_RECEIVED,
        &*PO_COMMAND_FAILURES,
        &*INVENTORY_ADJUSTMENTS,
        &*INVENTORY_ADJUSTMENT_FAILURES,
    );

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| MetricsError::ExportError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registered_counters() {
        PO_CREATIONS.inc();
        let text = render().unwrap();
        assert!(text.contains("orderflow_purchase_order_creations_total"));
        assert!(text.contains("orderflow_inventory_adjustments_total"));
    }
}
