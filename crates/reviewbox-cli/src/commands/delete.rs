use std::path::Path;

use reviewbox_core::Review;

use crate::commands::common::{load_config, open_service, parse_review_id};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path, config_path: &Path) -> Result<Review, CliError> {
    let review_id = parse_review_id(id)?;
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let session = reviews.open_session().await?;

    let removed = reviews
        .delete(review_id, session.device_token(), session.role())
        .await?;
    println!("{}", removed.id);
    Ok(removed)
}
