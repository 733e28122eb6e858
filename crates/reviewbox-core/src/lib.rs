//! reviewbox-core - Core library for Reviewbox
//!
//! This crate contains the review model, the device-local key-value storage
//! layer, the session/admin gate, and the relay agent that forwards reviews to
//! an external form inbox. The CLI is a thin layer on top of it.

pub mod config;
pub mod error;
pub mod export;
pub mod kv;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;
pub mod util;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use export::{render_reviews_export, suggested_export_file_name, ExportFormat};
pub use models::{DeviceToken, Rating, Review, ReviewDraft, ReviewId, ReviewUpdate, Role};
pub use session::{AdminGate, Session};
pub use store::{Permissions, ReviewService, ReviewStore};
pub use sync::{HttpRelay, Relay, RelayEndpoint, RelayOutcome, SyncAgent, SyncEvent};
