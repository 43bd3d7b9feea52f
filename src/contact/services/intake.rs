//! Service layer sequencing validation, moderation, and persistence.
//!
//! Provides [`ContactIntakeService`], which accepts raw contact forms and
//! stores the ones that pass both the field rules and content moderation.

use crate::contact::{
    domain::{
        ContactDomainError, ContactId, ContactRecord, ContactSubmission, StoreBackend,
        SubmissionForm,
    },
    ports::{ContactStore, StoreError},
};
use crate::moderation::ContentModerator;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Text returned to the sender of an accepted submission.
pub const ACKNOWLEDGEMENT: &str =
    "Thank you for your message! We've received your submission and will get back to you soon.";

/// Text returned to the sender of a submission that failed moderation.
pub const REJECTION_NOTICE: &str =
    "Your message contains inappropriate content. Please revise and try again.";

/// Page size used by the admin listing when none is requested.
pub const DEFAULT_LIST_LIMIT: usize = 100;

const SERVICE_NAME: &str = "contact-desk";
const HEALTHY: &str = "healthy";

/// Service-level errors for contact intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// A form field broke an intake rule.
    #[error(transparent)]
    Invalid(#[from] ContactDomainError),

    /// Moderation judged the message unacceptable.
    #[error("submission rejected by moderation: {explanation}")]
    Rejected {
        /// Moderator's reason; logged, not shown to the sender.
        explanation: String,
    },

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntakeError {
    /// Returns the text safe to show the sender.
    ///
    /// Field errors are described; moderation reasons and store failures
    /// are not.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Invalid(err) => err.to_string(),
            Self::Rejected { .. } => REJECTION_NOTICE.to_owned(),
            Self::Store(_) => "An unexpected error occurred. Please try again later.".to_owned(),
        }
    }
}

/// Result type for intake service operations.
pub type IntakeResult<T> = Result<T, IntakeError>;

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReceipt {
    /// Identifier of the stored record.
    pub contact_id: ContactId,
    /// Acknowledgement for the sender.
    pub message: String,
}

/// Liveness summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Active store backend.
    pub database: StoreBackend,
}

/// Contact intake orchestration service.
///
/// The store and moderator are built once at startup and shared; the
/// service holds no other state.
#[derive(Clone)]
pub struct ContactIntakeService {
    store: Arc<dyn ContactStore>,
    moderator: Arc<ContentModerator>,
}

impl ContactIntakeService {
    /// Creates a service over an initialised store and moderator.
    #[must_use]
    pub const fn new(store: Arc<dyn ContactStore>, moderator: Arc<ContentModerator>) -> Self {
        Self { store, moderator }
    }

    /// Validates, moderates, and stores a contact form.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Invalid`] when a field rule fails,
    /// [`IntakeError::Rejected`] when moderation flags the message, and
    /// [`IntakeError::Store`] when persistence fails. Nothing is stored
    /// unless every stage passes.
    pub async fn submit(&self, form: SubmissionForm) -> IntakeResult<IntakeReceipt> {
        let submission = ContactSubmission::new(form)?;
        info!(email = %submission.email(), "contact submission received");

        let verdict = self.moderator.moderate(submission.message()).await;
        if !verdict.is_clean {
            warn!(
                email = %submission.email(),
                explanation = %verdict.explanation,
                source = %verdict.source,
                "contact submission rejected by moderation"
            );
            return Err(IntakeError::Rejected {
                explanation: verdict.explanation,
            });
        }

        let contact_id = self.store.create(submission.contact()).await?;
        info!(contact_id = %contact_id, email = %submission.email(), "contact submission stored");
        Ok(IntakeReceipt {
            contact_id,
            message: ACKNOWLEDGEMENT.to_owned(),
        })
    }

    /// Fetches a stored contact.
    ///
    /// Returns `Ok(None)` when no contact has the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Store`] when the store fails.
    pub async fn contact(&self, id: &ContactId) -> IntakeResult<Option<ContactRecord>> {
        Ok(self.store.get(id).await?)
    }

    /// Lists stored contacts for the admin view.
    ///
    /// `limit` defaults to [`DEFAULT_LIST_LIMIT`] and `offset` to zero.
    /// Whether `offset` is honoured depends on the store backend.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Store`] when the store fails.
    pub async fn contacts(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> IntakeResult<Vec<ContactRecord>> {
        let records = self
            .store
            .list(limit.unwrap_or(DEFAULT_LIST_LIMIT), offset.unwrap_or(0))
            .await?;
        Ok(records)
    }

    /// Reports liveness and the active backend.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: HEALTHY,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            database: self.store.backend(),
        }
    }
}
