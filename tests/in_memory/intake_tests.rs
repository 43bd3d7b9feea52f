//! End-to-end intake through the in-memory backend.

use super::helpers::{intake_service, moderator};
use contact_desk::contact::{
    domain::SubmissionForm,
    services::{ACKNOWLEDGEMENT, IntakeError, REJECTION_NOTICE},
};
use contact_desk::moderation::ContentModerator;
use eyre::{Report, ensure, eyre};
use rstest::rstest;
use std::sync::Arc;

fn form_json(message: &str) -> String {
    serde_json::json!({
        "fullName": "Katherine Johnson",
        "email": "katherine@example.net",
        "phoneNumber": "+1 757 555 0100",
        "countryCode": "us",
        "message": message,
    })
    .to_string()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_submission_is_listed(moderator: Arc<ContentModerator>) -> Result<(), Report> {
    let service = intake_service(moderator).await?;
    let form: SubmissionForm = serde_json::from_str(&form_json(
        "Thank you for your service, looking forward to hearing back.",
    ))?;

    let receipt = service.submit(form).await?;
    let listed = service.contacts(None, None).await?;

    ensure!(receipt.message == ACKNOWLEDGEMENT, "unexpected acknowledgement");
    let record = listed
        .first()
        .ok_or_else(|| eyre!("submission was not listed"))?;
    ensure!(record.id() == &receipt.contact_id, "listed id mismatch");
    ensure!(record.country_code() == "US", "country code not normalised");
    Ok(())
}

#[rstest]
#[case("WE ARE THE BEST SHOP IN TOWN, VISIT NOW")]
#[case("This is damn slow, answer me already")]
#[tokio::test(flavor = "multi_thread")]
async fn flagged_submission_is_rejected(
    moderator: Arc<ContentModerator>,
    #[case] message: &str,
) -> Result<(), Report> {
    let service = intake_service(moderator).await?;
    let form: SubmissionForm = serde_json::from_str(&form_json(message))?;

    let result = service.submit(form).await;

    ensure!(
        matches!(result, Err(IntakeError::Rejected { .. })),
        "expected a moderation rejection, got {result:?}"
    );
    if let Err(err) = result {
        ensure!(err.public_message() == REJECTION_NOTICE, "rejection text leaked details");
    }
    ensure!(service.contacts(None, None).await?.is_empty(), "rejected submission was stored");
    Ok(())
}
