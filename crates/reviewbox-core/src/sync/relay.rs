//! HTTP delivery of a single review.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::endpoint::{RelayBody, RelayEndpoint, RelayPayload};
use crate::error::{Error, Result};
use crate::models::Review;
use crate::util::compact_text;

/// Result of one delivery attempt.
///
/// Only `Delivered` marks a review as synced. A rejection and an unreachable
/// endpoint are treated the same way: the review stays pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    Rejected { status: u16, message: String },
    Unreachable(String),
}

impl RelayOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Rejected { status, message } => write!(f, "rejected: {message} ({status})"),
            Self::Unreachable(message) => write!(f, "unreachable: {message}"),
        }
    }
}

/// Something that can forward one review to the outside world.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, review: &Review) -> RelayOutcome;
}

/// `reqwest`-backed relay for a configured [`RelayEndpoint`].
#[derive(Clone)]
pub struct HttpRelay {
    endpoint: RelayEndpoint,
    client: reqwest::Client,
}

impl HttpRelay {
    pub fn new(endpoint: RelayEndpoint, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.normalized()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                Error::InvalidConfig(format!("failed to build relay HTTP client: {error}"))
            })?;
        Ok(Self { endpoint, client })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &RelayEndpoint {
        &self.endpoint
    }

    async fn send(
        &self,
        payload: &RelayPayload,
    ) -> std::result::Result<RelayOutcome, reqwest::Error> {
        let request = self.client.post(self.endpoint.url());
        let request = match self.endpoint.encode(payload) {
            RelayBody::Form(fields) => request.form(&fields),
            RelayBody::Json(body) => request
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&body),
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(RelayOutcome::Delivered);
        }

        let body = response.text().await.unwrap_or_default();
        Ok(RelayOutcome::Rejected {
            status: status.as_u16(),
            message: parse_api_error(status, &body),
        })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn relay(&self, review: &Review) -> RelayOutcome {
        let payload = RelayPayload::from(review);
        match self.send(&payload).await {
            Ok(outcome) => outcome,
            Err(error) => RelayOutcome::Unreachable(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<RelayFieldError>,
}

#[derive(Debug, Deserialize)]
struct RelayFieldError {
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<RelayErrorBody>(body) {
        let first_field_error = payload
            .errors
            .into_iter()
            .find_map(|field_error| field_error.message);
        if let Some(message) = payload.message.or(payload.error).or(first_field_error) {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
