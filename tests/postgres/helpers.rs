//! Shared helpers for `PostgreSQL` integration tests.

use super::cluster::{ScratchDatabase, shared_cluster};
use contact_desk::contact::adapters::postgres::{ContactPgPool, PostgresContactStore};
use contact_desk::contact::ports::ContactStore;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{Report, eyre};
use mockable::DefaultClock;
use std::sync::Arc;

/// Environment variable naming an external database to test against
/// instead of the embedded cluster.
pub const DATABASE_URL_ENV: &str = "CONTACT_DESK_TEST_DATABASE_URL";

/// An initialised store plus the scratch database backing it, if any.
///
/// Field order matters: the store's pool must close before the scratch
/// database is dropped.
pub struct PreparedStore {
    pub store: Arc<PostgresContactStore>,
    database: Option<ScratchDatabase>,
}

impl PreparedStore {
    /// Whether this store has a database to itself.
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        self.database.is_some()
    }
}

fn external_database_url() -> Option<String> {
    std::env::var(DATABASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Builds and initialises a store.
///
/// Uses [`DATABASE_URL_ENV`] when it is set; otherwise creates a scratch
/// database on the shared embedded cluster.
///
/// # Errors
///
/// Returns an error when the database cannot be created, the pool cannot be
/// built, or the schema cannot be provisioned.
pub async fn postgres_store() -> Result<PreparedStore, Report> {
    let (url, database) = match external_database_url() {
        Some(url) => (url, None),
        None => {
            let database = scratch_database().await?;
            (database.url(), Some(database))
        }
    };

    let pool: ContactPgPool = tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(8)
            .build(ConnectionManager::<PgConnection>::new(url))
    })
    .await??;

    let store = PostgresContactStore::from_pool(pool, Arc::new(DefaultClock));
    store.initialize().await?;
    Ok(PreparedStore {
        store: Arc::new(store),
        database,
    })
}

async fn scratch_database() -> Result<ScratchDatabase, Report> {
    // Cluster start-up blocks on its own runtime, so it runs on a thread
    // with no runtime context.
    tokio::task::spawn_blocking(|| {
        let cluster = std::thread::spawn(shared_cluster)
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        cluster.scratch_database()
    })
    .await
    .map_err(|err| eyre!("scratch database task failed: {err}"))?
}
