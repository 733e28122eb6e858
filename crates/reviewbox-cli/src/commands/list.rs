use std::path::Path;

use crate::commands::common::{
    format_review_lines, load_config, open_service, review_to_list_item, ReviewListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: Option<usize>,
    as_json: bool,
    db_path: &Path,
    config_path: &Path,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let session = reviews.open_session().await?;

    let mut listed = reviews.list().await;
    if let Some(limit) = limit {
        listed.truncate(limit);
    }

    if as_json {
        let json_items = listed
            .iter()
            .map(|review| review_to_list_item(review, &session))
            .collect::<Vec<ReviewListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if listed.is_empty() {
        println!("No reviews yet.");
    } else {
        for line in format_review_lines(&listed, &session) {
            println!("{line}");
        }
    }

    Ok(())
}
