//! Startup wiring that turns the store configuration into one backend.

use super::{
    dynamodb::{BlockingPool, DynamoDbClient, KeyValueContactStore},
    memory::InMemoryContactStore,
    postgres::PostgresContactStore,
};
use crate::config::StoreConfig;
use crate::contact::{domain::StoreBackend, ports::ContactStore, ports::InitializationError};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Builds the contact store named by `config.backend`.
///
/// The selector is parsed before anything is constructed, so an unknown
/// backend fails without touching the network. Construction builds client
/// handles only; connections are opened by [`ContactStore::initialize`].
///
/// # Errors
///
/// Returns [`InitializationError::UnknownBackend`] for an unrecognised
/// selector and [`InitializationError::Unreachable`] when the key-value
/// client cannot be built.
pub fn build_contact_store(
    config: &StoreConfig,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<Arc<dyn ContactStore>, InitializationError> {
    let backend = config
        .backend()
        .map_err(|err| InitializationError::UnknownBackend(err.0))?;
    info!(backend = %backend, "building contact store");

    let store: Arc<dyn ContactStore> = match backend {
        StoreBackend::Memory => Arc::new(InMemoryContactStore::new(clock)),
        StoreBackend::Postgres => {
            Arc::new(PostgresContactStore::new(config.postgres.clone(), clock))
        }
        StoreBackend::DynamoDb => {
            let settings = &config.dynamodb;
            let client =
                DynamoDbClient::connect(settings).map_err(InitializationError::unreachable)?;
            Arc::new(KeyValueContactStore::new(
                Arc::new(client),
                settings.table_name.clone(),
                BlockingPool::new(settings.worker_pool_size),
                clock,
            ))
        }
    };
    Ok(store)
}
