//! Blocking `DynamoDB` client built on the AWS SDK.
//!
//! The SDK is asynchronous; this wrapper drives each request to completion
//! before returning so that it satisfies the blocking [`KeyValueClient`]
//! contract. Callers are expected to run it on a blocking thread.

use crate::config::DynamoDbSettings;
use crate::contact::ports::{KeyValueClient, KeyValueError, KeyValueItem, TableStatus};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus as SdkTableStatus,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

const CREDENTIALS_PROVIDER_NAME: &str = "contact-desk-config";

/// Blocks on an SDK future using whichever runtime is usable from the
/// current thread.
fn block_on<F, T>(runtime: &Runtime, future: F) -> Result<T, KeyValueError>
where
    F: Future<Output = Result<T, KeyValueError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| KeyValueError::Backend(err.to_string()))
                .and_then(|private| private.block_on(future));
            drop(tx.send(result));
        });
        return rx.recv().unwrap_or_else(|_| {
            Err(KeyValueError::Backend(
                "dynamodb request thread exited".to_owned(),
            ))
        });
    }

    runtime.block_on(future)
}

fn backend_error<E: std::error::Error>(err: &E) -> KeyValueError {
    KeyValueError::Backend(DisplayErrorContext(err).to_string())
}

fn to_item(attributes: &HashMap<String, AttributeValue>) -> Result<KeyValueItem, KeyValueError> {
    attributes
        .iter()
        .map(|(name, value)| {
            value
                .as_s()
                .map(|text| (name.clone(), text.clone()))
                .map_err(|_| KeyValueError::InvalidItem(format!("attribute {name} is not a string")))
        })
        .collect()
}

/// `DynamoDB` client presenting a blocking API.
pub struct DynamoDbClient {
    client: Client,
    runtime: Option<Arc<Runtime>>,
}

impl Drop for DynamoDbClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            // Dropping a runtime from inside an async context panics.
            drop(std::thread::spawn(move || drop(runtime)));
        }
    }
}

impl DynamoDbClient {
    /// Builds a client from connection settings.
    ///
    /// Resolves the AWS configuration (region, endpoint override, and either
    /// static or default-chain credentials). No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::Backend`] when the private runtime cannot be
    /// created.
    pub fn connect(settings: &DynamoDbSettings) -> Result<Self, KeyValueError> {
        let runtime = Runtime::new().map_err(|err| KeyValueError::Backend(err.to_string()))?;
        let region = settings.region.clone();
        let endpoint = settings.endpoint_url.clone();
        let credentials = settings.static_credentials().map(|(access_key, secret_key)| {
            Credentials::new(access_key, secret_key, None, None, CREDENTIALS_PROVIDER_NAME)
        });

        let shared_config = block_on(&runtime, async move {
            let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
            if let Some(url) = endpoint {
                loader = loader.endpoint_url(url);
            }
            if let Some(static_credentials) = credentials {
                loader = loader.credentials_provider(static_credentials);
            }
            Ok(loader.load().await)
        })?;

        Ok(Self {
            client: Client::new(&shared_config),
            runtime: Some(Arc::new(runtime)),
        })
    }

    fn runtime(&self) -> Result<&Runtime, KeyValueError> {
        self.runtime
            .as_deref()
            .ok_or_else(|| KeyValueError::Backend("dynamodb runtime closed".to_owned()))
    }
}

impl KeyValueClient for DynamoDbClient {
    fn describe_table(&self, table: &str) -> Result<TableStatus, KeyValueError> {
        let client = self.client.clone();
        let name = table.to_owned();
        block_on(self.runtime()?, async move {
            let output = client
                .describe_table()
                .table_name(&name)
                .send()
                .await
                .map_err(|err| {
                    if err
                        .as_service_error()
                        .is_some_and(DescribeTableError::is_resource_not_found_exception)
                    {
                        KeyValueError::TableNotFound(name.clone())
                    } else {
                        backend_error(&err)
                    }
                })?;
            let status = match output.table().and_then(|description| description.table_status()) {
                Some(SdkTableStatus::Active) => TableStatus::Active,
                Some(SdkTableStatus::Creating) => TableStatus::Creating,
                Some(other) => TableStatus::Other(other.as_str().to_owned()),
                None => TableStatus::Other("unknown".to_owned()),
            };
            Ok(status)
        })
    }

    fn create_table(&self, table: &str, hash_key: &str) -> Result<(), KeyValueError> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(hash_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|err| backend_error(&err))?;
        let definition = AttributeDefinition::builder()
            .attribute_name(hash_key)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|err| backend_error(&err))?;
        let client = self.client.clone();
        let name = table.to_owned();

        block_on(self.runtime()?, async move {
            let result = client
                .create_table()
                .table_name(name)
                .key_schema(key_schema)
                .attribute_definitions(definition)
                .billing_mode(BillingMode::PayPerRequest)
                .send()
                .await;
            match result {
                Ok(_) => Ok(()),
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(CreateTableError::is_resource_in_use_exception) =>
                {
                    Ok(())
                }
                Err(err) => Err(backend_error(&err)),
            }
        })
    }

    fn put_item(&self, table: &str, item: KeyValueItem) -> Result<(), KeyValueError> {
        let client = self.client.clone();
        let name = table.to_owned();
        let attributes: HashMap<String, AttributeValue> = item
            .into_iter()
            .map(|(attribute, value)| (attribute, AttributeValue::S(value)))
            .collect();

        block_on(self.runtime()?, async move {
            client
                .put_item()
                .table_name(name)
                .set_item(Some(attributes))
                .send()
                .await
                .map_err(|err| backend_error(&err))?;
            Ok(())
        })
    }

    fn get_item(
        &self,
        table: &str,
        key_attribute: &str,
        key: &str,
    ) -> Result<Option<KeyValueItem>, KeyValueError> {
        let client = self.client.clone();
        let name = table.to_owned();
        let attribute = key_attribute.to_owned();
        let value = AttributeValue::S(key.to_owned());

        block_on(self.runtime()?, async move {
            let output = client
                .get_item()
                .table_name(name)
                .key(attribute, value)
                .consistent_read(true)
                .send()
                .await
                .map_err(|err| backend_error(&err))?;
            output.item().map(to_item).transpose()
        })
    }

    fn scan(&self, table: &str, limit: usize) -> Result<Vec<KeyValueItem>, KeyValueError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let client = self.client.clone();
        let name = table.to_owned();
        let page_limit = i32::try_from(limit).unwrap_or(i32::MAX);

        block_on(self.runtime()?, async move {
            let output = client
                .scan()
                .table_name(name)
                .limit(page_limit)
                .send()
                .await
                .map_err(|err| backend_error(&err))?;
            output.items().iter().map(to_item).collect()
        })
    }
}
