//! Shared fixtures for in-memory integration tests.

use contact_desk::config::ContactDeskConfig;
use contact_desk::contact::{
    adapters::factory::build_contact_store, ports::ContactStore,
    services::ContactIntakeService,
};
use contact_desk::moderation::ContentModerator;
use eyre::Report;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Builds and initialises the store selected by an empty configuration.
///
/// # Errors
///
/// Returns an error when the store cannot be built or initialised.
pub async fn default_store() -> Result<Arc<dyn ContactStore>, Report> {
    let config = ContactDeskConfig::from_toml_str("")?;
    let store = build_contact_store(&config.store, Arc::new(DefaultClock))?;
    store.initialize().await?;
    Ok(store)
}

/// Provides a fallback-only moderator.
#[fixture]
pub fn moderator() -> Arc<ContentModerator> {
    Arc::new(ContentModerator::fallback_only())
}

/// Builds an intake service over a fresh in-memory store.
///
/// # Errors
///
/// Returns an error when the store cannot be built.
pub async fn intake_service(
    moderator: Arc<ContentModerator>,
) -> Result<ContactIntakeService, Report> {
    Ok(ContactIntakeService::new(default_store().await?, moderator))
}
