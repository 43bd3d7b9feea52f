//! Startup configuration for the contact desk.
//!
//! Configuration is parsed from TOML. Every section has defaults, so an
//! empty document yields an in-memory store with a local Ollama moderator.
//! The library never reads files or environment variables itself; callers
//! hand it the document contents.

use crate::contact::domain::{ParseStoreBackendError, StoreBackend};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while parsing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML for the configuration schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The store backend selector is not recognised.
    #[error(transparent)]
    UnknownBackend(#[from] ParseStoreBackendError),
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactDeskConfig {
    /// Record store selection and backend settings.
    pub store: StoreConfig,
    /// Content moderation settings.
    pub moderation: ModerationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl ContactDeskConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document cannot be parsed or fails
    /// validation.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.store.backend()? {
            StoreBackend::Memory => {}
            StoreBackend::Postgres => self.store.postgres.validate()?,
            StoreBackend::DynamoDb => self.store.dynamodb.validate()?,
        }
        self.moderation.validate()
    }
}

/// Record store selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend selector: `memory`, `postgres`, or `dynamodb`.
    pub backend: String,
    /// `PostgreSQL` connection settings.
    pub postgres: PostgresSettings,
    /// `DynamoDB` connection settings.
    pub dynamodb: DynamoDbSettings,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory.as_str().to_owned(),
            postgres: PostgresSettings::default(),
            dynamodb: DynamoDbSettings::default(),
        }
    }
}

impl StoreConfig {
    /// Parses the backend selector.
    ///
    /// # Errors
    ///
    /// Returns [`ParseStoreBackendError`] when the selector is not recognised.
    pub fn backend(&self) -> Result<StoreBackend, ParseStoreBackendError> {
        StoreBackend::try_from(self.backend.as_str())
    }
}

/// `PostgreSQL` connection settings.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostgresSettings {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Seconds to wait for a connection before failing.
    pub connect_timeout_secs: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 5432,
            user: "postgres".to_owned(),
            password: "password".to_owned(),
            database: "emptymug".to_owned(),
            pool_size: 10,
            connect_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl PostgresSettings {
    /// Builds the connection URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("store.postgres.host must be set".to_owned()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "store.postgres.database must be set".to_owned(),
            ));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "store.postgres.pool_size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// `DynamoDB` connection settings.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DynamoDbSettings {
    /// AWS region.
    pub region: String,
    /// Table holding contact records.
    pub table_name: String,
    /// Static access key; the default credential chain is used when unset.
    pub access_key_id: Option<String>,
    /// Static secret key paired with `access_key_id`.
    pub secret_access_key: Option<String>,
    /// Endpoint override, e.g. a local `DynamoDB` emulator.
    pub endpoint_url: Option<String>,
    /// Fixed number of worker threads for blocking client calls.
    pub worker_pool_size: usize,
}

impl Default for DynamoDbSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
            table_name: "emptymug_contacts".to_owned(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            worker_pool_size: 10,
        }
    }
}

impl std::fmt::Debug for DynamoDbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbSettings")
            .field("region", &self.region)
            .field("table_name", &self.table_name)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .field("worker_pool_size", &self.worker_pool_size)
            .finish()
    }
}

impl DynamoDbSettings {
    /// Returns static credentials when both halves are configured.
    #[must_use]
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        let access_key = self.access_key_id.as_deref().filter(|v| !v.is_empty())?;
        let secret_key = self
            .secret_access_key
            .as_deref()
            .filter(|v| !v.is_empty())?;
        Some((access_key, secret_key))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "store.dynamodb.table_name must be set".to_owned(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("store.dynamodb.region must be set".to_owned()));
        }
        if self.worker_pool_size == 0 {
            return Err(ConfigError::Invalid(
                "store.dynamodb.worker_pool_size must be at least 1".to_owned(),
            ));
        }
        if let Some(endpoint) = &self.endpoint_url
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(
                "store.dynamodb.endpoint_url must include http:// or https://".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Inference-backed moderation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModerationConfig {
    /// Base URL of the Ollama server.
    pub ollama_host: String,
    /// Model identifier.
    pub ollama_model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature for classification requests.
    pub temperature: f32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost:11434".to_owned(),
            ollama_model: "llama2".to_owned(),
            timeout_secs: 30,
            temperature: 0.1,
        }
    }
}

impl ModerationConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "moderation.timeout_secs must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level for this crate when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}
