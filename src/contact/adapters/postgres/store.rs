//! `PostgreSQL` contact store.

use super::{
    models::{ContactRow, NewContactRow},
    schema::{CREATE_CONTACTS_TABLE_SQL, contacts},
};
use crate::config::PostgresSettings;
use crate::contact::{
    domain::{ContactId, ContactRecord, NewContact, StoreBackend},
    ports::{ContactStore, InitializationError, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::Clock;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// `PostgreSQL` connection pool type used by the contact store.
pub type ContactPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed contact store.
///
/// Every call checks out a pooled connection on the blocking thread pool,
/// runs one statement inside its own transaction, and hands the connection
/// back. No connection or transaction outlives a call.
pub struct PostgresContactStore {
    settings: Option<PostgresSettings>,
    pool: OnceLock<ContactPgPool>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl PostgresContactStore {
    /// Creates a store that connects on [`ContactStore::initialize`].
    #[must_use]
    pub fn new(settings: PostgresSettings, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            settings: Some(settings),
            pool: OnceLock::new(),
            clock,
        }
    }

    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: ContactPgPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            settings: None,
            pool: OnceLock::from(pool),
            clock,
        }
    }

    async fn connect(&self) -> Result<ContactPgPool, InitializationError> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool.clone());
        }
        let settings = self.settings.clone().ok_or_else(|| {
            InitializationError::Configuration(
                "postgres store has neither settings nor a pool".to_owned(),
            )
        })?;

        let built = tokio::task::spawn_blocking(move || {
            let manager = ConnectionManager::<PgConnection>::new(settings.database_url());
            Pool::builder()
                .max_size(settings.pool_size)
                .connection_timeout(settings.connect_timeout())
                .build(manager)
        })
        .await
        .map_err(InitializationError::unreachable)?
        .map_err(InitializationError::unreachable)?;

        Ok(self.pool.get_or_init(|| built).clone())
    }

    async fn run_in_transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.get().cloned().ok_or(StoreError::NotInitialized)?;
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(StoreError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection.transaction(f).map_err(StoreError::persistence)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn initialize(&self) -> Result<(), InitializationError> {
        let pool = self.connect().await?;
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(InitializationError::unreachable)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .batch_execute(CREATE_CONTACTS_TABLE_SQL)
                .map_err(InitializationError::provisioning)
        })
        .await
        .map_err(InitializationError::unreachable)??;

        info!("postgres contact store ready");
        Ok(())
    }

    async fn create(&self, contact: &NewContact) -> StoreResult<ContactId> {
        let row = NewContactRow::new(contact, self.clock.utc());
        let id = self
            .run_in_transaction(move |connection| {
                diesel::insert_into(contacts::table)
                    .values(&row)
                    .returning(contacts::id)
                    .get_result::<String>(connection)
            })
            .await?;
        debug!(contact_id = %id, "contact row inserted");
        Ok(ContactId::new(id))
    }

    async fn get(&self, id: &ContactId) -> StoreResult<Option<ContactRecord>> {
        let key = id.as_str().to_owned();
        let row = self
            .run_in_transaction(move |connection| {
                contacts::table
                    .find(key)
                    .select(ContactRow::as_select())
                    .first::<ContactRow>(connection)
                    .optional()
            })
            .await?;
        Ok(row.map(ContactRecord::from))
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<ContactRecord>> {
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql_offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = self
            .run_in_transaction(move |connection| {
                contacts::table
                    .order((contacts::created_at.asc(), contacts::id.asc()))
                    .offset(sql_offset)
                    .limit(sql_limit)
                    .select(ContactRow::as_select())
                    .load::<ContactRow>(connection)
            })
            .await?;
        Ok(rows.into_iter().map(ContactRecord::from).collect())
    }
}
