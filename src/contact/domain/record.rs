//! Contact record types persisted by the record stores.

use super::ContactId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated contact fields handed to a store for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    /// Sender's full name.
    pub full_name: String,
    /// Sender's email address.
    pub email: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Free-text message body.
    pub message: String,
}

/// Immutable stored contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    id: ContactId,
    #[serde(flatten)]
    fields: NewContact,
    created_at: DateTime<Utc>,
}

impl ContactRecord {
    /// Assembles a record from its identifier, fields, and creation time.
    #[must_use]
    pub const fn new(id: ContactId, fields: NewContact, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            fields,
            created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> &ContactId {
        &self.id
    }

    /// Returns the stored contact fields.
    #[must_use]
    pub const fn fields(&self) -> &NewContact {
        &self.fields
    }

    /// Returns the sender's full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.fields.full_name
    }

    /// Returns the sender's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.fields.email
    }

    /// Returns the phone number, if one was supplied.
    #[must_use]
    pub fn phone_number(&self) -> Option<&str> {
        self.fields.phone_number.as_deref()
    }

    /// Returns the country code.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.fields.country_code
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.fields.message
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
