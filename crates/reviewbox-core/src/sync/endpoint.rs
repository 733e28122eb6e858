//! Relay destinations and their request encodings.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::Review;
use crate::util::{is_http_url, normalize_text_option};

/// Google Forms question ids (`entry.<n>`) for each relayed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleFormFields {
    pub name: String,
    pub rating: String,
    pub service: String,
    pub text: String,
    pub date: String,
}

/// Operator-configured form endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayEndpoint {
    /// `formResponse` URL of a Google Form, URL-encoded fields
    GoogleForms {
        url: String,
        fields: GoogleFormFields,
    },
    /// Formspree form URL, JSON body
    Formspree { url: String },
    /// Any endpoint accepting the public fields as a JSON object
    Json { url: String },
}

/// Public fields of a review. Ids and owner tokens never leave the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub name: String,
    pub rating: u8,
    pub service: String,
    pub text: String,
    pub date: String,
}

impl From<&Review> for RelayPayload {
    fn from(review: &Review) -> Self {
        Self {
            name: review.name.clone(),
            rating: review.rating.value(),
            service: review.service_label().unwrap_or_default().to_string(),
            text: review.text.clone(),
            date: review.date.clone(),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl RelayEndpoint {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::GoogleForms { url, .. } | Self::Formspree { url } | Self::Json { url } => url,
        }
    }

    /// Short label for logs and status output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GoogleForms { .. } => "google_forms",
            Self::Formspree { .. } => "formspree",
            Self::Json { .. } => "json",
        }
    }

    /// Trim every value and check the URL scheme and field ids.
    pub fn normalized(self) -> Result<Self> {
        match self {
            Self::GoogleForms { url, fields } => Ok(Self::GoogleForms {
                url: normalize_url(url)?,
                fields: GoogleFormFields {
                    name: required_field(fields.name, "name")?,
                    rating: required_field(fields.rating, "rating")?,
                    service: required_field(fields.service, "service")?,
                    text: required_field(fields.text, "text")?,
                    date: required_field(fields.date, "date")?,
                },
            }),
            Self::Formspree { url } => Ok(Self::Formspree {
                url: normalize_url(url)?,
            }),
            Self::Json { url } => Ok(Self::Json {
                url: normalize_url(url)?,
            }),
        }
    }

    #[must_use]
    pub fn encode(&self, payload: &RelayPayload) -> RelayBody {
        match self {
            Self::GoogleForms { fields, .. } => RelayBody::Form(vec![
                (fields.name.clone(), payload.name.clone()),
                (fields.rating.clone(), payload.rating.to_string()),
                (fields.service.clone(), payload.service.clone()),
                (fields.text.clone(), payload.text.clone()),
                (fields.date.clone(), payload.date.clone()),
            ]),
            Self::Formspree { .. } => RelayBody::Json(json!({
                "name": payload.name,
                "rating": payload.rating,
                "service": payload.service,
                "message": payload.text,
                "date": payload.date,
                "_subject": format!("New review from {}", payload.name),
            })),
            Self::Json { .. } => RelayBody::Json(json!(payload)),
        }
    }
}

fn normalize_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidConfig("relay url must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url)
    } else {
        Err(Error::InvalidConfig(
            "relay url must include http:// or https://".to_string(),
        ))
    }
}

fn required_field(raw: String, field: &str) -> Result<String> {
    normalize_text_option(Some(raw)).ok_or_else(|| {
        Error::InvalidConfig(format!("google form field id for '{field}' is required"))
    })
}
