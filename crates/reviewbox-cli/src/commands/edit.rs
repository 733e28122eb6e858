use std::path::Path;

use reviewbox_core::{Rating, Review, ReviewUpdate};

use crate::commands::common::{load_config, open_service, parse_review_id};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    name: Option<String>,
    service: Option<String>,
    rating: Option<u8>,
    text: Option<String>,
    db_path: &Path,
    config_path: &Path,
) -> Result<Review, CliError> {
    let review_id = parse_review_id(id)?;
    let update = ReviewUpdate {
        name,
        service,
        rating: rating.map(Rating::new).transpose()?,
        text,
    };
    if update.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    let update = update.validate()?;

    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let session = reviews.open_session().await?;
    if !session.is_privileged() {
        return Err(CliError::AdminRequired);
    }

    let Some(updated) = reviews.update(review_id, update, session.role()).await? else {
        return Err(CliError::ReviewNotFound(review_id.to_string()));
    };
    println!("{}", updated.id);
    Ok(updated)
}
