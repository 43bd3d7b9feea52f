//! `DynamoDB` key-value adapter for contact persistence.

mod client;
mod local;
mod pool;
mod store;

pub use client::DynamoDbClient;
pub use local::LocalKeyValueClient;
pub use pool::{BlockingPool, BlockingPoolError, DEFAULT_POOL_SIZE};
pub use store::KeyValueContactStore;
