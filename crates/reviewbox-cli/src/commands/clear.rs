use std::path::Path;

use crate::commands::common::{load_config, open_service};
use crate::error::CliError;

pub async fn run_clear(
    confirmed: bool,
    db_path: &Path,
    config_path: &Path,
) -> Result<usize, CliError> {
    if !confirmed {
        return Err(CliError::ConfirmationRequired);
    }

    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let session = reviews.open_session().await?;

    let removed = reviews.clear_all(session.role()).await?;
    println!("Deleted {removed} reviews");
    Ok(removed)
}
