//! Diesel schema for contact persistence.

diesel::table! {
    /// Contact-form submissions.
    contacts (id) {
        /// Record identifier (UUID text assigned by the column default).
        #[max_length = 36]
        id -> Varchar,
        /// Sender's full name.
        #[max_length = 255]
        full_name -> Varchar,
        /// Sender's email address.
        #[max_length = 255]
        email -> Varchar,
        /// Optional phone number.
        #[max_length = 20]
        phone_number -> Nullable<Varchar>,
        /// Country code.
        #[max_length = 10]
        country_code -> Varchar,
        /// Message body.
        message -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

/// Additive DDL applied by `initialize`. Never drops existing data.
pub(super) const CREATE_CONTACTS_TABLE_SQL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS contacts (",
    "id VARCHAR(36) PRIMARY KEY DEFAULT gen_random_uuid()::text, ",
    "full_name VARCHAR(255) NOT NULL, ",
    "email VARCHAR(255) NOT NULL, ",
    "phone_number VARCHAR(20), ",
    "country_code VARCHAR(10) NOT NULL, ",
    "message TEXT NOT NULL, ",
    "created_at TIMESTAMPTZ NOT NULL DEFAULT now()",
    "); ",
    "CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts (created_at, id);",
);
