pub mod adjust_inventory_command;
pub mod create_inventory_record_command;

pub use adjust_inventory_command::{AdjustInventoryCommand, AdjustInventoryResult};
pub use create_inventory_record_command::CreateInventoryRecordCommand;
