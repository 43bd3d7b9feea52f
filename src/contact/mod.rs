//! Contact-form intake and persistence.
//!
//! Accepted submissions are stored through the [`ports::ContactStore`]
//! contract, implemented by an in-memory map, a `PostgreSQL` table, and a
//! `DynamoDB` table reached through a blocking client. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
