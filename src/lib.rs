//! Contact desk: contact-form intake with moderated, pluggable persistence.
//!
//! Submissions are validated, screened by a two-stage content moderator,
//! and stored in one of several interchangeable record stores chosen once
//! at startup.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`config`]: Startup configuration parsed from TOML
//! - [`contact`]: Submission rules, record stores, and the intake service
//! - [`moderation`]: Inference-backed content moderation with a heuristic
//!   fallback

pub mod config;
pub mod contact;
pub mod moderation;
