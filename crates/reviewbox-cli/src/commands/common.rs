use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use reviewbox_core::{
    AppConfig, Permissions, RelayOutcome, Review, ReviewId, ReviewService, Session, SyncAgent,
};
use serde::Serialize;

use crate::error::CliError;

const DB_PATH_ENV: &str = "REVIEWBOX_DB_PATH";
const CONFIG_PATH_ENV: &str = "REVIEWBOX_CONFIG";
const ADMIN_SECRET_ENV: &str = "REVIEWBOX_ADMIN_SECRET";

#[derive(Debug, Serialize)]
pub struct ReviewListItem {
    pub id: i64,
    pub initial: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub rating: u8,
    pub stars: String,
    pub text: String,
    pub date: String,
    pub relative_time: String,
    pub synced: bool,
    pub is_own: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("reviewbox").join("reviews.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve data directory".to_string()))
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) =
        cli_config_path.or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
    {
        return Ok(path);
    }
    default_config_path()
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("reviewbox").join("config.json"))
        .ok_or_else(|| CliError::Config("Failed to resolve config directory".to_string()))
}

/// Load the config file and apply environment overrides.
pub fn load_config(config_path: &Path) -> Result<AppConfig, CliError> {
    let config = AppConfig::load_from_path(config_path)?;
    Ok(config.with_admin_secret_override(env::var(ADMIN_SECRET_ENV).ok()))
}

pub fn open_service(db_path: &Path, config: &AppConfig) -> Result<ReviewService, CliError> {
    Ok(ReviewService::open_path(db_path, &config.date_format)?)
}

/// Relay agent for the configured endpoint, or `None` when relaying is off.
pub fn build_agent(
    service: &ReviewService,
    config: &AppConfig,
) -> Result<Option<SyncAgent>, CliError> {
    let Some(relay) = config.http_relay()? else {
        return Ok(None);
    };
    Ok(Some(
        SyncAgent::new(service.clone(), Arc::new(relay))
            .with_max_attempts(config.max_relay_attempts),
    ))
}

pub fn parse_review_id(id: &str) -> Result<ReviewId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyReviewId);
    }
    trimmed
        .parse::<ReviewId>()
        .map_err(|_| CliError::InvalidReviewId(trimmed.to_string()))
}

pub fn format_review_lines(reviews: &[Review], session: &Session) -> Vec<String> {
    reviews
        .iter()
        .map(|review| {
            let permissions = Permissions::for_review(review, session);
            let mut header = format!(
                "{}  [{}] {}  {}  {}",
                review.id,
                review.initial(),
                review.name,
                review.rating.stars(),
                review.date
            );
            if let Some(service) = review.service_label() {
                header.push_str("  ");
                header.push_str(service);
            }
            if permissions.is_own {
                header.push_str("  (your review)");
            }
            if !review.synced {
                header.push_str("  *pending");
            }
            format!("{header}\n    {}", review_preview(review, 100))
        })
        .collect()
}

pub fn review_to_list_item(review: &Review, session: &Session) -> ReviewListItem {
    let permissions = Permissions::for_review(review, session);
    ReviewListItem {
        id: review.id.as_millis(),
        initial: review.initial(),
        name: review.name.clone(),
        service: review.service_label().map(str::to_string),
        rating: review.rating.value(),
        stars: review.rating.stars(),
        text: review.text.clone(),
        date: review.date.clone(),
        relative_time: format_relative_time(review.timestamp, Utc::now().timestamp_millis()),
        synced: review.synced,
        is_own: permissions.is_own,
        can_edit: permissions.can_edit,
        can_delete: permissions.can_delete,
    }
}

pub fn review_preview(review: &Review, max_chars: usize) -> String {
    let collapsed = review.text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Soft notice for a relay that did not confirm delivery. The review is
/// already stored either way.
pub fn relay_advisory(outcome: &RelayOutcome) -> Option<String> {
    if outcome.is_delivered() {
        None
    } else {
        Some(format!(
            "Saved on this device; relay will be retried by `reviewbox sync` ({outcome})"
        ))
    }
}

/// Review text from arguments, falling back to piped stdin.
///
/// Returns an empty string when neither has content so validation can report
/// the missing text.
pub fn resolve_review_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }

    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
