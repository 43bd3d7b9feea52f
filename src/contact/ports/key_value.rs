//! Synchronous key-value client port used by the key-value record store.
//!
//! Every method blocks the calling thread. Callers on an async runtime must
//! dispatch calls onto a blocking pool rather than invoking them directly.

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// A stored item: attribute name to string value.
pub type KeyValueItem = BTreeMap<String, String>;

/// Lifecycle status reported for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    /// The table is being created and cannot serve traffic yet.
    Creating,
    /// The table is ready to serve traffic.
    Active,
    /// Any other status reported by the backend.
    Other(String),
}

/// Polling schedule used while waiting for a table to become active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum number of status probes.
    pub attempts: u32,
    /// Delay between probes.
    pub delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            attempts: 60,
            delay: Duration::from_secs(2),
        }
    }
}

/// Errors returned by key-value clients.
#[derive(Debug, Clone, Error)]
pub enum KeyValueError {
    /// The table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The table did not become active within the wait policy.
    #[error("table {table} not active after {attempts} probes")]
    WaitTimedOut {
        /// Table name.
        table: String,
        /// Probes performed.
        attempts: u32,
    },

    /// An item could not be written or read in the expected shape.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// The backend rejected the request or could not be reached.
    #[error("key-value backend error: {0}")]
    Backend(String),
}

/// Blocking key-value store client.
pub trait KeyValueClient: Send + Sync + 'static {
    /// Reports the status of a table.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::TableNotFound`] when the table is absent, or
    /// [`KeyValueError::Backend`] when the backend cannot be reached.
    fn describe_table(&self, table: &str) -> Result<TableStatus, KeyValueError>;

    /// Creates a table keyed by a single string hash attribute.
    ///
    /// Creating a table that already exists succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::Backend`] when the backend rejects creation.
    fn create_table(&self, table: &str, hash_key: &str) -> Result<(), KeyValueError>;

    /// Writes an item, replacing any item with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError`] when the write is rejected.
    fn put_item(&self, table: &str, item: KeyValueItem) -> Result<(), KeyValueError>;

    /// Reads the item whose `key_attribute` equals `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError`] when the read fails.
    fn get_item(
        &self,
        table: &str,
        key_attribute: &str,
        key: &str,
    ) -> Result<Option<KeyValueItem>, KeyValueError>;

    /// Enumerates up to `limit` items in backend-native order.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError`] when the scan fails.
    fn scan(&self, table: &str, limit: usize) -> Result<Vec<KeyValueItem>, KeyValueError>;

    /// Blocks until the table reports [`TableStatus::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::WaitTimedOut`] when the policy is exhausted,
    /// or the first probe error other than the table being absent.
    fn wait_until_active(&self, table: &str, policy: WaitPolicy) -> Result<(), KeyValueError> {
        for attempt in 1..=policy.attempts {
            match self.describe_table(table) {
                Ok(TableStatus::Active) => return Ok(()),
                Ok(_) | Err(KeyValueError::TableNotFound(_)) => {}
                Err(err) => return Err(err),
            }
            if attempt < policy.attempts {
                std::thread::sleep(policy.delay);
            }
        }
        Err(KeyValueError::WaitTimedOut {
            table: table.to_owned(),
            attempts: policy.attempts,
        })
    }
}
