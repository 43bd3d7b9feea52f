//! Record store contract checks against the key-value backend.

use super::helpers::{as_dyn, local_store};
use crate::test_helpers::{
    assert_concurrent_creates_distinct, assert_create_then_get, assert_list_capped,
    assert_unknown_id_not_found, sample_contact,
};
use contact_desk::contact::{domain::StoreBackend, ports::ContactStore};
use eyre::{Report, ensure};

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_preserves_fields() -> Result<(), Report> {
    let store = local_store().await?;
    assert_create_then_get(&*store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn list_is_capped_by_limit() -> Result<(), Report> {
    let store = local_store().await?;
    assert_list_capped(&*store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_id_is_not_found() -> Result<(), Report> {
    let store = local_store().await?;
    assert_unknown_id_not_found(&*store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creates_are_distinct() -> Result<(), Report> {
    let store = local_store().await?;
    assert_concurrent_creates_distinct(as_dyn(&store), 40).await?;
    ensure!(
        store.pool().idle() == store.pool().size(),
        "pool slots leaked after the burst"
    );
    Ok(())
}

/// Offsets are accepted but not applied: the second page repeats the first.
#[tokio::test(flavor = "multi_thread")]
async fn second_page_may_equal_first_page() -> Result<(), Report> {
    let store = local_store().await?;
    for index in 0..10 {
        store.create(&sample_contact(index)).await?;
    }

    let first = store.list(5, 0).await?;
    let second = store.list(5, 5).await?;

    ensure!(first.len() == 5, "expected a full first page");
    ensure!(first == second, "offset unexpectedly changed the page");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reinitialising_keeps_existing_records() -> Result<(), Report> {
    let store = local_store().await?;
    let id = store.create(&sample_contact(3)).await?;

    store.initialize().await?;

    ensure!(store.get(&id).await?.is_some(), "record lost on re-initialise");
    ensure!(store.backend() == StoreBackend::DynamoDb, "wrong backend reported");
    Ok(())
}
