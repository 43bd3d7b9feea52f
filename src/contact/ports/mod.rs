//! Port contracts for contact persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the intake
//! service and implemented by the storage adapters.

pub mod key_value;
pub mod store;

pub use key_value::{KeyValueClient, KeyValueError, KeyValueItem, TableStatus, WaitPolicy};
pub use store::{ContactStore, InitializationError, StoreError, StoreResult};
