//! Record store contract checks against `PostgreSQL`.

use super::helpers::postgres_store;
use crate::test_helpers::{
    assert_concurrent_creates_distinct, assert_create_then_get, assert_list_capped,
    assert_unknown_id_not_found,
};
use contact_desk::contact::{domain::StoreBackend, ports::ContactStore};
use eyre::{Report, ensure};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_preserves_fields() -> Result<(), Report> {
    let prepared = postgres_store().await?;
    assert_create_then_get(&*prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn list_is_capped_by_limit() -> Result<(), Report> {
    let prepared = postgres_store().await?;
    assert_list_capped(&*prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_id_is_not_found() -> Result<(), Report> {
    let prepared = postgres_store().await?;
    assert_unknown_id_not_found(&*prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creates_are_distinct() -> Result<(), Report> {
    let prepared = postgres_store().await?;
    let store: Arc<dyn ContactStore> = Arc::clone(&prepared.store) as Arc<dyn ContactStore>;
    assert_concurrent_creates_distinct(store, 24).await?;

    if prepared.is_isolated() {
        let listed = prepared.store.list(100, 0).await?;
        ensure!(listed.len() == 24, "expected 24 rows, found {}", listed.len());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialize_is_idempotent() -> Result<(), Report> {
    let prepared = postgres_store().await?;
    prepared.store.initialize().await?;
    ensure!(
        prepared.store.backend() == StoreBackend::Postgres,
        "wrong backend reported"
    );
    Ok(())
}
