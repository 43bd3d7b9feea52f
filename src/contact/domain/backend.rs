//! Storage backend selector.

use super::ParseStoreBackendError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Record store backend kinds selectable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map with no persistence across restarts.
    Memory,
    /// `PostgreSQL` relational backend.
    Postgres,
    /// `DynamoDB` key-value backend.
    DynamoDb,
}

impl StoreBackend {
    /// Returns the canonical selector string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::DynamoDb => "dynamodb",
        }
    }
}

impl TryFrom<&str> for StoreBackend {
    type Error = ParseStoreBackendError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "relational" => Ok(Self::Postgres),
            "dynamodb" | "key-value" | "key_value" => Ok(Self::DynamoDb),
            _ => Err(ParseStoreBackendError(value.to_owned())),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ParseStoreBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
