//! Application services for contact intake and retrieval.

mod intake;

pub use intake::{
    ACKNOWLEDGEMENT, ContactIntakeService, DEFAULT_LIST_LIMIT, HealthReport, IntakeError,
    IntakeReceipt, IntakeResult, REJECTION_NOTICE,
};
