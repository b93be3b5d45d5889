use crate::{errors::ServiceError, events::EventSender, repositories::Stores};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// This trait allows for encapsulating all the logic needed to execute a business operation
/// into a single object that can be validated, executed, and produce events.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `stores` - In-memory record stores the command reads and mutates
    /// * `event_sender` - Channel to publish domain events
    ///
    /// # Returns
    /// * `Result<Self::Result, ServiceError>` - The result of command execution or an error
    async fn execute(
        &self,
        stores: Arc<Stores>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod inventory;
pub mod purchaseorders;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::ledger::MAX_UNIT_PRICE;

/// Prices may be zero (free samples) but never negative, and never above
/// [`MAX_UNIT_PRICE`].
pub(crate) fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if price.is_sign_negative() && !price.is_zero() {
        "Price cannot be negative".to_string()
    } else if *price > MAX_UNIT_PRICE {
        format!("Price cannot exceed {}", MAX_UNIT_PRICE)
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("unit_price");
    err.message = Some(message.into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(2.25), true)]
    #[case(dec!(1000000000), true)]
    #[case(dec!(-0.01), false)]
    #[case(dec!(1000000000.01), false)]
    fn unit_prices_are_bounded(#[case] price: Decimal, #[case] accepted: bool) {
        assert_eq!(validate_unit_price(&price).is_ok(), accepted);
    }
}
