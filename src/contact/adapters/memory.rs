//! In-memory contact store.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::contact::{
    domain::{ContactId, ContactRecord, NewContact, StoreBackend},
    ports::{ContactStore, InitializationError, StoreError, StoreResult},
};

/// Thread-safe, insertion-ordered in-memory contact store.
///
/// Nothing survives a process restart.
#[derive(Clone)]
pub struct InMemoryContactStore {
    state: Arc<RwLock<InMemoryContactState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct InMemoryContactState {
    records: Vec<ContactRecord>,
    index: HashMap<ContactId, usize>,
}

impl InMemoryContactStore {
    /// Creates an empty store stamping records with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::default(),
            clock,
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn initialize(&self) -> Result<(), InitializationError> {
        Ok(())
    }

    async fn create(&self, contact: &NewContact) -> StoreResult<ContactId> {
        let id = ContactId::generate();
        let record = ContactRecord::new(id.clone(), contact.clone(), self.clock.utc());

        let mut state = self.state.write().map_err(lock_error)?;
        let position = state.records.len();
        state.records.push(record);
        state.index.insert(id.clone(), position);
        Ok(id)
    }

    async fn get(&self, id: &ContactId) -> StoreResult<Option<ContactRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        let record = state
            .index
            .get(id)
            .and_then(|position| state.records.get(*position))
            .cloned();
        Ok(record)
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<ContactRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .records
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
