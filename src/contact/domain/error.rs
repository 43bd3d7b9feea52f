//! Error types for contact domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing a contact submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContactDomainError {
    /// A required field is empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The name is outside the accepted length range.
    #[error("name must be between {min} and {max} characters, got {actual}")]
    NameLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
        /// Observed length.
        actual: usize,
    },

    /// The name contains no alphabetic character.
    #[error("name must contain at least one letter")]
    NameWithoutLetter,

    /// The email address is structurally invalid.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The phone number exceeds the storage limit.
    #[error("phone number exceeds {max} characters")]
    PhoneNumberTooLong {
        /// Maximum accepted length.
        max: usize,
    },

    /// The country code is not a two-letter code.
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    /// The message is shorter than the minimum length.
    #[error("message must be at least {min} characters long")]
    MessageTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// The message exceeds the maximum length.
    #[error("message must be less than {max} characters")]
    MessageTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Error returned when a store backend selector is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported store backend: {0}")]
pub struct ParseStoreBackendError(pub String);
