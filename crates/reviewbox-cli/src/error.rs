use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reviewbox_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Review ID cannot be empty")]
    EmptyReviewId,
    #[error("Invalid review ID: {0}")]
    InvalidReviewId(String),
    #[error("Review not found for id: {0}")]
    ReviewNotFound(String),
    #[error("Nothing to change. Pass at least one of --name, --service, --rating, --text")]
    EmptyUpdate,
    #[error("Refusing to delete all reviews without --yes")]
    ConfirmationRequired,
    #[error("Admin mode is required. Run `reviewbox admin login` first.")]
    AdminRequired,
    #[error("No admin password provided")]
    EmptyPassword,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Admin mode is not configured. Run `reviewbox config init --admin-secret <SECRET>` or set REVIEWBOX_ADMIN_SECRET."
    )]
    AdminNotConfigured,
    #[error(
        "No relay endpoint configured. Run `reviewbox config init --relay <KIND> --relay-url <URL>`."
    )]
    RelayNotConfigured,
}
