// Purchase order lifecycle and receiving
pub mod procurement;

// Stock levels and locations
pub mod inventory;

// Reference data
pub mod catalog;
pub mod suppliers;

// Read-only overview
pub mod dashboard;
