//! `PostgreSQL` adapter for contact persistence.

mod models;
mod schema;
mod store;

pub use store::{ContactPgPool, PostgresContactStore};
