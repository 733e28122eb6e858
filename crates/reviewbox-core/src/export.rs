//! Review export for operators.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::Review;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Public view of a review. The owner token stays out of exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReview {
    pub id: i64,
    pub date: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub rating: u8,
    pub text: String,
    pub synced: bool,
}

#[must_use]
pub fn review_to_export_item(review: &Review) -> ExportReview {
    ExportReview {
        id: review.id.as_millis(),
        date: review.date.clone(),
        name: review.name.clone(),
        service: review.service_label().map(str::to_string),
        rating: review.rating.value(),
        text: review.text.clone(),
        synced: review.synced,
    }
}

pub fn render_json_export(reviews: &[Review]) -> serde_json::Result<String> {
    let items = reviews
        .iter()
        .map(review_to_export_item)
        .collect::<Vec<ExportReview>>();
    serde_json::to_string_pretty(&items)
}

/// Spreadsheet-friendly CSV in store order.
#[must_use]
pub fn render_csv_export(reviews: &[Review]) -> String {
    let mut output = String::from("Date,Name,Service,Rating,Review");

    for review in reviews {
        let _ = write!(
            output,
            "\n{},{},{},{},{}",
            csv_quote(&review.date),
            csv_quote(&review.name),
            csv_quote(review.service_label().unwrap_or_default()),
            review.rating.value(),
            csv_quote(&review.text),
        );
    }

    output
}

pub fn render_reviews_export(
    reviews: &[Review],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Csv => Ok(render_csv_export(reviews)),
        ExportFormat::Json => render_json_export(reviews),
    }
}

#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("reviews-export-{timestamp_ms}.{}", format.extension())
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
