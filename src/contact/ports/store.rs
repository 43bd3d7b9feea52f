//! Record store port for contact persistence.

use crate::contact::domain::{ContactId, ContactRecord, NewContact, StoreBackend};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for per-call record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Contact persistence contract shared by every backend.
///
/// Records are immutable once created and are never deleted, so the
/// contract has no update or delete operation.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Reports which backend this store is.
    fn backend(&self) -> StoreBackend;

    /// Establishes connections and provisions schema or tables if absent.
    ///
    /// Idempotent. Must complete before any other operation is called.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError`] when the backend is unreachable or the
    /// schema cannot be provisioned. Callers abort startup; nothing retries.
    async fn initialize(&self) -> Result<(), InitializationError>;

    /// Stores a new record and returns its store-generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write is rejected or the backend is
    /// unavailable.
    async fn create(&self, contact: &NewContact) -> StoreResult<ContactId>;

    /// Fetches a record by identifier.
    ///
    /// Returns `None` when no record has the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    async fn get(&self, id: &ContactId) -> StoreResult<Option<ContactRecord>>;

    /// Lists at most `limit` records starting at `offset`.
    ///
    /// Ordering is backend-defined. Backends that cannot skip records may
    /// ignore `offset`; none returns more than `limit` records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<ContactRecord>>;
}

/// Fatal errors raised while bringing a store up.
#[derive(Debug, Clone, Error)]
pub enum InitializationError {
    /// The configured backend selector is not recognised.
    #[error("unsupported store backend: {0}")]
    UnknownBackend(String),

    /// Backend settings are unusable.
    #[error("invalid store configuration: {0}")]
    Configuration(String),

    /// The backend could not be reached.
    #[error("store backend unreachable: {0}")]
    Unreachable(Arc<dyn std::error::Error + Send + Sync>),

    /// The schema or table could not be provisioned.
    #[error("failed to provision store schema: {0}")]
    Provisioning(Arc<dyn std::error::Error + Send + Sync>),
}

impl InitializationError {
    /// Wraps a connectivity failure.
    pub fn unreachable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreachable(Arc::new(err))
    }

    /// Wraps a schema provisioning failure.
    pub fn provisioning(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Provisioning(Arc::new(err))
    }
}

/// Errors returned by individual record store calls.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store was used before [`ContactStore::initialize`] completed.
    #[error("record store has not been initialized")]
    NotInitialized,

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
