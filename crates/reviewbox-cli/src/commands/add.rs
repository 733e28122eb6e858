use std::path::Path;

use reviewbox_core::{Review, ReviewDraft};

use crate::commands::common::{
    build_agent, load_config, open_service, relay_advisory, resolve_review_text,
};
use crate::error::CliError;

pub async fn run_add(
    name: Option<&str>,
    service: Option<&str>,
    rating: Option<u8>,
    text_parts: &[String],
    db_path: &Path,
    config_path: &Path,
) -> Result<Review, CliError> {
    let text = resolve_review_text(text_parts)?;
    let mut draft = ReviewDraft::new(name.unwrap_or_default(), rating, text);
    if let Some(service) = service {
        draft = draft.with_service(service);
    }
    let candidate = draft.validate()?;

    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let session = reviews.open_session().await?;
    let review = reviews.create(candidate, &session).await?;
    println!("{}", review.id);

    if let Some(agent) = build_agent(&reviews, &config)? {
        let outcome = match agent.relay_in_background(review.clone()).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!("Relay task failed: {}", error);
                return Ok(review);
            }
        };
        if let Some(advisory) = relay_advisory(&outcome) {
            eprintln!("{advisory}");
        }
    }

    Ok(review)
}
