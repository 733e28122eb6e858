//! Review model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::DeviceToken;
use crate::util::normalize_text_option;

/// A review identifier: the creation time in Unix milliseconds.
///
/// Ids are assumed unique because two reviews are never created within the
/// same millisecond on one device. Nothing enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(i64);

impl ReviewId {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReviewId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Star rating.
///
/// `Rating::new` only accepts 1..=5. Persisted values are trusted as-is and
/// are never clamped, so a hand-edited out-of-range value survives a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Validation(format!(
                "Rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Render as filled and empty stars, e.g. `★★★★☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX).saturating_sub(filled);
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted review.
///
/// Field names on disk match the storage layout of the original web widget,
/// so a collection exported from a browser can be loaded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier (creation time, ms)
    pub id: ReviewId,
    /// Reviewer name
    pub name: String,
    /// Service the review is about, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Star rating
    pub rating: Rating,
    /// Review body
    pub text: String,
    /// Display date, rendered when the review was created or last edited
    pub date: String,
    /// Unix ms of creation, refreshed on edit
    pub timestamp: i64,
    /// Device that wrote the review
    #[serde(rename = "userToken", default)]
    pub owner_token: DeviceToken,
    /// Set once the relay endpoint confirmed delivery
    #[serde(default, skip_serializing_if = "is_false")]
    pub synced: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl Review {
    /// Service label, treating an empty string as no service.
    #[must_use]
    pub fn service_label(&self) -> Option<&str> {
        self.service
            .as_deref()
            .map(str::trim)
            .filter(|service| !service.is_empty())
    }

    /// Uppercased first character of the name, used as an avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_owned_by(&self, token: &DeviceToken) -> bool {
        &self.owner_token == token
    }
}

/// Raw form input, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub name: String,
    pub service: Option<String>,
    pub rating: Option<u8>,
    pub text: String,
}

impl ReviewDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, rating: Option<u8>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service: None,
            rating,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Check required fields in form order: name, rating, text.
    pub fn validate(&self) -> Result<NewReview> {
        let name = required(&self.name, "Please enter your name")?;

        let Some(rating) = self.rating else {
            return Err(Error::Validation("Please choose a rating".to_string()));
        };
        let rating = Rating::new(rating)?;

        let text = required(&self.text, "Please write a review")?;

        Ok(NewReview {
            name,
            service: normalize_text_option(self.service.clone()),
            rating,
            text,
        })
    }
}

fn required(value: &str, message: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

/// A validated review candidate accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub name: String,
    pub service: Option<String>,
    pub rating: Rating,
    pub text: String,
}

/// Fields merged into an existing review by a privileged edit.
///
/// `None` leaves a field unchanged. `service: Some("")` clears the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub name: Option<String>,
    pub service: Option<String>,
    pub rating: Option<Rating>,
    pub text: Option<String>,
}

impl ReviewUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.service.is_none()
            && self.rating.is_none()
            && self.text.is_none()
    }

    /// Trim `name` and `text` and reject them when blank, with the same
    /// messages as [`ReviewDraft::validate`].
    pub fn validate(self) -> Result<Self> {
        let name = self
            .name
            .map(|name| required(&name, "Please enter your name"))
            .transpose()?;
        let text = self
            .text
            .map(|text| required(&text, "Please write a review"))
            .transpose()?;
        Ok(Self { name, text, ..self })
    }

    pub(crate) fn apply_to(self, review: &mut Review) {
        if let Some(name) = self.name {
            review.name = name;
        }
        if let Some(service) = self.service {
            review.service = normalize_text_option(Some(service));
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(text) = self.text {
            review.text = text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_review() -> Review {
        Review {
            id: ReviewId::from_millis(1_700_000_000_000),
            name: "anna".to_string(),
            service: Some("Facial".to_string()),
            rating: Rating::new(5).unwrap(),
            text: "Great massage".to_string(),
            date: "14.11.2023".to_string(),
            timestamp: 1_700_000_000_000,
            owner_token: DeviceToken::from("user_1_abc"),
            synced: false,
        }
    }

    #[test]
    fn test_review_id_parse() {
        let id: ReviewId = " 1700000000000 ".parse().unwrap();
        assert_eq!(id, ReviewId::from_millis(1_700_000_000_000));
        assert!("abc".parse::<ReviewId>().is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(3).unwrap().value(), 3);
    }

    #[test]
    fn test_rating_stars() {
        assert_eq!(Rating::new(4).unwrap().stars(), "★★★★☆");
        assert_eq!(Rating::new(1).unwrap().stars(), "★☆☆☆☆");
    }

    #[test]
    fn test_out_of_range_rating_is_not_clamped_on_load() {
        let review: Review = serde_json::from_str(
            r#"{"id":1,"name":"x","rating":9,"text":"t","date":"d","timestamp":1,"userToken":"u"}"#,
        )
        .unwrap();
        assert_eq!(review.rating.value(), 9);
        assert_eq!(review.rating.stars(), "★★★★★★★★★");
    }

    #[test]
    fn test_review_json_uses_storage_field_names() {
        let json = serde_json::to_value(sample_review()).unwrap();
        assert_eq!(json["userToken"], "user_1_abc");
        assert_eq!(json["id"], 1_700_000_000_000_i64);
        assert!(json.get("synced").is_none());
        assert!(json.get("owner_token").is_none());
    }

    #[test]
    fn test_review_loads_browser_record() {
        let raw = r#"{
            "id": 1700000000000,
            "name": "Anna",
            "service": "",
            "rating": 5,
            "text": "Great massage",
            "date": "14.11.2023",
            "timestamp": 1700000000000,
            "userToken": "user_1700000000000_k3j9x0abc"
        }"#;
        let review: Review = serde_json::from_str(raw).unwrap();
        assert!(!review.synced);
        assert_eq!(review.service.as_deref(), Some(""));
        assert_eq!(review.service_label(), None);
    }

    #[test]
    fn test_initial_uppercases_first_char() {
        assert_eq!(sample_review().initial(), "A");
        let mut review = sample_review();
        review.name = "ёжик".to_string();
        assert_eq!(review.initial(), "Ё");
    }

    #[test]
    fn test_draft_validation_order() {
        let missing_name = ReviewDraft::new("  ", None, "");
        assert_eq!(
            missing_name.validate().unwrap_err().to_string(),
            "Please enter your name"
        );

        let missing_rating = ReviewDraft::new("Anna", None, "");
        assert_eq!(
            missing_rating.validate().unwrap_err().to_string(),
            "Please choose a rating"
        );

        let missing_text = ReviewDraft::new("Anna", Some(5), " \n ");
        assert_eq!(
            missing_text.validate().unwrap_err().to_string(),
            "Please write a review"
        );
    }

    #[test]
    fn test_draft_validation_normalizes_fields() {
        let draft = ReviewDraft::new(" Anna ", Some(5), " Great massage ").with_service("  ");
        let candidate = draft.validate().unwrap();
        assert_eq!(candidate.name, "Anna");
        assert_eq!(candidate.text, "Great massage");
        assert_eq!(candidate.service, None);
    }

    #[test]
    fn test_update_merges_only_supplied_fields() {
        let mut review = sample_review();
        ReviewUpdate {
            text: Some("Even better".to_string()),
            service: Some(String::new()),
            ..ReviewUpdate::default()
        }
        .apply_to(&mut review);

        assert_eq!(review.text, "Even better");
        assert_eq!(review.service, None);
        assert_eq!(review.name, "anna");
        assert_eq!(review.rating.value(), 5);
    }

    #[test]
    fn test_update_validation_trims_and_rejects_blank_fields() {
        let blank_name = ReviewUpdate {
            name: Some(String::new()),
            ..ReviewUpdate::default()
        };
        assert_eq!(
            blank_name.validate().unwrap_err().to_string(),
            "Please enter your name"
        );

        let blank_text = ReviewUpdate {
            text: Some("   ".to_string()),
            ..ReviewUpdate::default()
        };
        assert_eq!(
            blank_text.validate().unwrap_err().to_string(),
            "Please write a review"
        );

        let update = ReviewUpdate {
            name: Some(" Ben ".to_string()),
            service: Some(String::new()),
            text: Some(" Better now ".to_string()),
            ..ReviewUpdate::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("Ben"));
        assert_eq!(update.text.as_deref(), Some("Better now"));
        assert_eq!(update.service.as_deref(), Some(""));
    }
}
