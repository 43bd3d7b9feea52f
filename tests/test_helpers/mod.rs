//! Record store contract checks shared by every backend suite.

use contact_desk::contact::{
    domain::{ContactId, NewContact},
    ports::ContactStore,
};
use eyre::{Report, ensure, eyre};
use std::collections::HashSet;
use std::sync::Arc;

/// Builds a distinct, already-valid contact.
pub fn sample_contact(index: usize) -> NewContact {
    NewContact {
        full_name: format!("Contract Sender {index}"),
        email: format!("contract{index}@example.org"),
        phone_number: ((index & 1) == 0).then(|| format!("+33 1 23 45 {index:02}")),
        country_code: "FR".to_owned(),
        message: format!("Contract message {index} asking about opening hours."),
    }
}

/// Checks that a created record reads back with every field intact.
///
/// # Errors
///
/// Returns an error describing the first broken expectation.
pub async fn assert_create_then_get(store: &dyn ContactStore) -> Result<(), Report> {
    for index in [0, 1] {
        let contact = sample_contact(index);
        let id = store.create(&contact).await?;
        ensure!(!id.as_str().is_empty(), "store returned an empty id");

        let record = store
            .get(&id)
            .await?
            .ok_or_else(|| eyre!("record {id} not found after create"))?;
        ensure!(record.id() == &id, "id mismatch for {id}");
        ensure!(record.fields() == &contact, "fields changed for {id}");
    }
    Ok(())
}

/// Checks that listing never returns more than the requested limit.
///
/// # Errors
///
/// Returns an error describing the first broken expectation.
pub async fn assert_list_capped(store: &dyn ContactStore) -> Result<(), Report> {
    for index in 10..16 {
        store.create(&sample_contact(index)).await?;
    }
    for limit in [0, 1, 3, 5] {
        let listed = store.list(limit, 0).await?;
        ensure!(
            listed.len() <= limit,
            "list({limit}, 0) returned {} records",
            listed.len()
        );
    }
    let listed = store.list(5, 0).await?;
    ensure!(listed.len() == 5, "expected a full page of 5, got {}", listed.len());
    Ok(())
}

/// Checks that an unknown identifier is a normal not-found result.
///
/// # Errors
///
/// Returns an error when the lookup fails or finds a record.
pub async fn assert_unknown_id_not_found(store: &dyn ContactStore) -> Result<(), Report> {
    for unknown in ["nonexistent-id", ""] {
        let found = store.get(&ContactId::new(unknown)).await?;
        ensure!(found.is_none(), "unexpected record for {unknown:?}");
    }
    Ok(())
}

/// Checks that concurrent creates never share an identifier.
///
/// # Errors
///
/// Returns an error when a create fails or two creates share an id.
pub async fn assert_concurrent_creates_distinct(
    store: Arc<dyn ContactStore>,
    count: usize,
) -> Result<(), Report> {
    let handles: Vec<_> = (0..count)
        .map(|index| {
            let writer = Arc::clone(&store);
            tokio::spawn(async move { writer.create(&sample_contact(100 + index)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await??);
    }
    ensure!(ids.len() == count, "expected {count} distinct ids, got {}", ids.len());
    Ok(())
}
