//! Key-value contact store bridged onto a bounded blocking pool.

use super::pool::{BlockingPool, BlockingPoolError};
use crate::contact::{
    domain::{ContactId, ContactRecord, NewContact, StoreBackend},
    ports::{
        ContactStore, InitializationError, KeyValueClient, KeyValueError, KeyValueItem,
        StoreError, StoreResult, TableStatus, WaitPolicy,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ID: &str = "id";
const FULL_NAME: &str = "full_name";
const EMAIL: &str = "email";
const PHONE_NUMBER: &str = "phone_number";
const COUNTRY_CODE: &str = "country_code";
const MESSAGE: &str = "message";
const CREATED_AT: &str = "created_at";

/// Contact store over a blocking key-value client.
///
/// Client calls run on a fixed-size [`BlockingPool`] so they never stall
/// the async scheduler.
///
/// `list` does not honour `offset`: the underlying scan only accepts a
/// result cap, so every page returns the first `limit` items in scan order.
pub struct KeyValueContactStore<C: KeyValueClient> {
    client: Arc<C>,
    pool: BlockingPool,
    table: String,
    wait_policy: WaitPolicy,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<C: KeyValueClient> KeyValueContactStore<C> {
    /// Creates a store over `client` writing to `table`.
    #[must_use]
    pub fn new(
        client: Arc<C>,
        table: impl Into<String>,
        pool: BlockingPool,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            client,
            pool,
            table: table.into(),
            wait_policy: WaitPolicy::default(),
            clock,
        }
    }

    /// Overrides the schedule used while waiting for a new table.
    #[must_use]
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// Returns the worker pool dispatching client calls.
    #[must_use]
    pub const fn pool(&self) -> &BlockingPool {
        &self.pool
    }

    async fn call<F, T>(&self, operation: F) -> Result<Result<T, KeyValueError>, BlockingPoolError>
    where
        F: FnOnce(&C, &str) -> Result<T, KeyValueError> + Send + 'static,
        T: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let table = self.table.clone();
        self.pool.run(move || operation(&client, &table)).await
    }

    async fn store_call<F, T>(&self, operation: F) -> StoreResult<T>
    where
        F: FnOnce(&C, &str) -> Result<T, KeyValueError> + Send + 'static,
        T: Send + 'static,
    {
        self.call(operation)
            .await
            .map_err(StoreError::persistence)?
            .map_err(StoreError::persistence)
    }

    async fn provision(&self) -> Result<(), InitializationError> {
        let policy = self.wait_policy;
        self.call(move |client, table| {
            client.create_table(table, ID)?;
            client.wait_until_active(table, policy)
        })
        .await
        .map_err(InitializationError::unreachable)?
        .map_err(InitializationError::provisioning)
    }
}

#[async_trait]
impl<C: KeyValueClient> ContactStore for KeyValueContactStore<C> {
    fn backend(&self) -> StoreBackend {
        StoreBackend::DynamoDb
    }

    async fn initialize(&self) -> Result<(), InitializationError> {
        let probe = self
            .call(|client, table| client.describe_table(table))
            .await
            .map_err(InitializationError::unreachable)?;

        match probe {
            Ok(TableStatus::Active) => {
                debug!(table = %self.table, "key-value table already active");
            }
            Ok(status) => {
                info!(table = %self.table, ?status, "waiting for key-value table");
                let policy = self.wait_policy;
                self.call(move |client, table| client.wait_until_active(table, policy))
                    .await
                    .map_err(InitializationError::unreachable)?
                    .map_err(InitializationError::provisioning)?;
            }
            Err(err) => {
                warn!(table = %self.table, error = %err, "key-value table probe failed; provisioning");
                self.provision().await?;
            }
        }

        info!(table = %self.table, workers = self.pool.size(), "key-value contact store ready");
        Ok(())
    }

    async fn create(&self, contact: &NewContact) -> StoreResult<ContactId> {
        let id = ContactId::generate();
        let item = to_item(&id, contact, self.clock.utc());
        self.store_call(move |client, table| client.put_item(table, item))
            .await?;
        debug!(contact_id = %id, "contact item written");
        Ok(id)
    }

    async fn get(&self, id: &ContactId) -> StoreResult<Option<ContactRecord>> {
        // The service rejects empty key values outright.
        if id.as_str().is_empty() {
            return Ok(None);
        }
        let key = id.as_str().to_owned();
        let item = self
            .store_call(move |client, table| client.get_item(table, ID, &key))
            .await?;
        item.map(from_item).transpose()
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<ContactRecord>> {
        if offset > 0 {
            debug!(offset, limit, "key-value listing ignores offset");
        }
        if limit == 0 {
            return Ok(Vec::new());
        }
        let items = self
            .store_call(move |client, table| client.scan(table, limit))
            .await?;
        items.into_iter().take(limit).map(from_item).collect()
    }
}

fn to_item(id: &ContactId, contact: &NewContact, created_at: DateTime<Utc>) -> KeyValueItem {
    let mut item = KeyValueItem::new();
    item.insert(ID.to_owned(), id.as_str().to_owned());
    item.insert(FULL_NAME.to_owned(), contact.full_name.clone());
    item.insert(EMAIL.to_owned(), contact.email.clone());
    if let Some(phone) = &contact.phone_number {
        item.insert(PHONE_NUMBER.to_owned(), phone.clone());
    }
    item.insert(COUNTRY_CODE.to_owned(), contact.country_code.clone());
    item.insert(MESSAGE.to_owned(), contact.message.clone());
    item.insert(CREATED_AT.to_owned(), created_at.to_rfc3339());
    item
}

fn from_item(mut item: KeyValueItem) -> StoreResult<ContactRecord> {
    let mut take = |attribute: &str| {
        item.remove(attribute).ok_or_else(|| {
            StoreError::invalid_persisted_data(KeyValueError::InvalidItem(format!(
                "missing attribute {attribute}"
            )))
        })
    };

    let id = take(ID)?;
    let full_name = take(FULL_NAME)?;
    let email = take(EMAIL)?;
    let country_code = take(COUNTRY_CODE)?;
    let message = take(MESSAGE)?;
    let created_at = DateTime::parse_from_rfc3339(&take(CREATED_AT)?)
        .map_err(StoreError::invalid_persisted_data)?
        .with_timezone(&Utc);
    let phone_number = item.remove(PHONE_NUMBER).filter(|phone| !phone.is_empty());

    let fields = NewContact {
        full_name,
        email,
        phone_number,
        country_code,
        message,
    };
    Ok(ContactRecord::new(ContactId::new(id), fields, created_at))
}
