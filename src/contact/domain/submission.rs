//! Contact-form submissions and their field rules.

use super::{ContactDomainError, NewContact};
use serde::Deserialize;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 255;
const PHONE_MAX_CHARS: usize = 20;
const MESSAGE_MIN_CHARS: usize = 10;
const MESSAGE_MAX_CHARS: usize = 5000;

/// Raw contact-form payload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    /// Sender's full name.
    pub full_name: String,
    /// Sender's email address.
    pub email: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Country code.
    pub country_code: String,
    /// Message body.
    pub message: String,
}

/// A contact-form submission whose fields passed the intake rules.
///
/// Fields are trimmed, the country code is upper-cased, and an empty phone
/// number is normalised to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    contact: NewContact,
}

impl ContactSubmission {
    /// Validates a raw form.
    ///
    /// # Errors
    ///
    /// Returns [`ContactDomainError`] for the first field rule violated, in
    /// form order (name, email, phone, country code, message).
    pub fn new(form: SubmissionForm) -> Result<Self, ContactDomainError> {
        let full_name = validate_name(&form.full_name)?;
        let email = validate_email(&form.email)?;
        let phone_number = validate_phone(form.phone_number.as_deref())?;
        let country_code = validate_country_code(&form.country_code)?;
        let message = validate_message(&form.message)?;

        Ok(Self {
            contact: NewContact {
                full_name,
                email,
                phone_number,
                country_code,
                message,
            },
        })
    }

    /// Returns the validated message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.contact.message
    }

    /// Returns the validated email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.contact.email
    }

    /// Returns the validated contact fields.
    #[must_use]
    pub const fn contact(&self) -> &NewContact {
        &self.contact
    }

    /// Consumes the submission, returning the fields to persist.
    #[must_use]
    pub fn into_contact(self) -> NewContact {
        self.contact
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ContactDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactDomainError::MissingField(field));
    }
    Ok(trimmed)
}

fn validate_name(raw: &str) -> Result<String, ContactDomainError> {
    let name = required(raw, "name")?;
    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        return Err(ContactDomainError::NameLength {
            min: NAME_MIN_CHARS,
            max: NAME_MAX_CHARS,
            actual: length,
        });
    }
    if !name.chars().any(char::is_alphabetic) {
        return Err(ContactDomainError::NameWithoutLetter);
    }
    Ok(name.to_owned())
}

fn validate_email(raw: &str) -> Result<String, ContactDomainError> {
    let email = required(raw, "email")?;
    let invalid = || ContactDomainError::InvalidEmail(email.to_owned());

    if email.chars().count() > EMAIL_MAX_CHARS || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let domain_is_valid = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_is_valid {
        return Err(invalid());
    }
    Ok(email.to_owned())
}

fn validate_phone(raw: Option<&str>) -> Result<Option<String>, ContactDomainError> {
    let Some(phone) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if phone.chars().count() > PHONE_MAX_CHARS {
        return Err(ContactDomainError::PhoneNumberTooLong {
            max: PHONE_MAX_CHARS,
        });
    }
    Ok(Some(phone.to_owned()))
}

fn validate_country_code(raw: &str) -> Result<String, ContactDomainError> {
    let code = required(raw, "country code")?.to_ascii_uppercase();
    let is_alpha2 = code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase());
    if !is_alpha2 {
        return Err(ContactDomainError::InvalidCountryCode(code));
    }
    Ok(code)
}

fn validate_message(raw: &str) -> Result<String, ContactDomainError> {
    let message = required(raw, "message")?;
    let length = message.chars().count();
    if length < MESSAGE_MIN_CHARS {
        return Err(ContactDomainError::MessageTooShort {
            min: MESSAGE_MIN_CHARS,
        });
    }
    if length > MESSAGE_MAX_CHARS {
        return Err(ContactDomainError::MessageTooLong {
            max: MESSAGE_MAX_CHARS,
        });
    }
    Ok(message.to_owned())
}
