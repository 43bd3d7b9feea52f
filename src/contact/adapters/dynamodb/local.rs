//! In-process key-value client for tests and local development.

use crate::contact::ports::{KeyValueClient, KeyValueError, KeyValueItem, TableStatus};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Blocking in-process key-value client.
///
/// Newly created tables report [`TableStatus::Creating`] for a configurable
/// number of status probes before turning active. Scans enumerate items in
/// hash order, which is unrelated to insertion order. Empty key values are
/// rejected, as the hosted service does.
#[derive(Debug, Default)]
pub struct LocalKeyValueClient {
    state: Mutex<LocalState>,
    activation_probes: usize,
}

#[derive(Debug, Default)]
struct LocalState {
    tables: HashMap<String, LocalTable>,
    create_table_calls: usize,
}

#[derive(Debug)]
struct LocalTable {
    hash_key: String,
    pending_probes: usize,
    items: HashMap<String, KeyValueItem>,
}

impl LocalKeyValueClient {
    /// Creates a client with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes new tables report `Creating` for `probes` status checks.
    #[must_use]
    pub fn with_activation_probes(mut self, probes: usize) -> Self {
        self.activation_probes = probes;
        self
    }

    /// Returns how many times table creation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::Backend`] when the state lock is poisoned.
    pub fn create_table_calls(&self) -> Result<usize, KeyValueError> {
        Ok(self.lock()?.create_table_calls)
    }

    /// Returns whether a table exists.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::Backend`] when the state lock is poisoned.
    pub fn has_table(&self, table: &str) -> Result<bool, KeyValueError> {
        Ok(self.lock()?.tables.contains_key(table))
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalState>, KeyValueError> {
        self.state
            .lock()
            .map_err(|err| KeyValueError::Backend(err.to_string()))
    }
}

fn table_mut<'a>(
    state: &'a mut LocalState,
    table: &str,
) -> Result<&'a mut LocalTable, KeyValueError> {
    state
        .tables
        .get_mut(table)
        .ok_or_else(|| KeyValueError::TableNotFound(table.to_owned()))
}

impl KeyValueClient for LocalKeyValueClient {
    fn describe_table(&self, table: &str) -> Result<TableStatus, KeyValueError> {
        let mut state = self.lock()?;
        let entry = table_mut(&mut state, table)?;
        if entry.pending_probes == 0 {
            return Ok(TableStatus::Active);
        }
        entry.pending_probes -= 1;
        Ok(TableStatus::Creating)
    }

    fn create_table(&self, table: &str, hash_key: &str) -> Result<(), KeyValueError> {
        let mut state = self.lock()?;
        state.create_table_calls += 1;
        state
            .tables
            .entry(table.to_owned())
            .or_insert_with(|| LocalTable {
                hash_key: hash_key.to_owned(),
                pending_probes: self.activation_probes,
                items: HashMap::new(),
            });
        Ok(())
    }

    fn put_item(&self, table: &str, item: KeyValueItem) -> Result<(), KeyValueError> {
        let mut state = self.lock()?;
        let entry = table_mut(&mut state, table)?;
        let key = item.get(&entry.hash_key).cloned().ok_or_else(|| {
            KeyValueError::InvalidItem(format!("missing hash key attribute {}", entry.hash_key))
        })?;
        entry.items.insert(key, item);
        Ok(())
    }

    fn get_item(
        &self,
        table: &str,
        key_attribute: &str,
        key: &str,
    ) -> Result<Option<KeyValueItem>, KeyValueError> {
        let mut state = self.lock()?;
        let entry = table_mut(&mut state, table)?;
        if entry.hash_key != key_attribute {
            return Err(KeyValueError::InvalidItem(format!(
                "{key_attribute} is not the hash key of {table}"
            )));
        }
        if key.is_empty() {
            return Err(KeyValueError::InvalidItem(format!(
                "empty value for key attribute {key_attribute}"
            )));
        }
        Ok(entry.items.get(key).cloned())
    }

    fn scan(&self, table: &str, limit: usize) -> Result<Vec<KeyValueItem>, KeyValueError> {
        let mut state = self.lock()?;
        let entry = table_mut(&mut state, table)?;
        Ok(entry.items.values().take(limit).cloned().collect())
    }
}
