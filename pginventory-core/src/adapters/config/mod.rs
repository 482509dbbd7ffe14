//! Configuration types.
//!
//! - `ConnectionConfig`: catalog connection settings
//! - `InventoryConfig`: fan-out and output settings
//!
//! Neither struct stores credentials.

mod connection;
mod inventory;

pub use connection::{ConnectionConfig, DEFAULT_ADMIN_DATABASE, RowEstimateMatch};
pub use inventory::{DEFAULT_OUTPUT_DIR, InventoryConfig};
