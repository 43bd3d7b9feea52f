//! Domain model for contact-form submissions.
//!
//! The contact domain models validated submissions, immutable stored
//! records, and the selector naming which storage backend holds them. All
//! infrastructure concerns are kept outside the domain boundary.

mod backend;
mod error;
mod ids;
mod record;
mod submission;

pub use backend::StoreBackend;
pub use error::{ContactDomainError, ParseStoreBackendError};
pub use ids::ContactId;
pub use record::{ContactRecord, NewContact};
pub use submission::{ContactSubmission, SubmissionForm};
