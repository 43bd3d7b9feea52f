//! Diesel row models for contact persistence.

use super::schema::contacts;
use crate::contact::domain::{ContactId, ContactRecord, NewContact};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for contact records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct ContactRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country_code: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactRow> for ContactRecord {
    fn from(row: ContactRow) -> Self {
        let ContactRow {
            id,
            full_name,
            email,
            phone_number,
            country_code,
            message,
            created_at,
        } = row;
        let fields = NewContact {
            full_name,
            email,
            phone_number,
            country_code,
            message,
        };
        Self::new(ContactId::new(id), fields, created_at)
    }
}

/// Insert model. The identifier is omitted so the column default assigns it.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contacts)]
pub(super) struct NewContactRow {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country_code: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewContactRow {
    pub(super) fn new(contact: &NewContact, created_at: DateTime<Utc>) -> Self {
        Self {
            full_name: contact.full_name.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            country_code: contact.country_code.clone(),
            message: contact.message.clone(),
            created_at,
        }
    }
}
