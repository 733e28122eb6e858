//! Data models for Reviewbox

mod identity;
mod review;

pub use identity::{DeviceToken, Role};
pub use review::{NewReview, Rating, Review, ReviewDraft, ReviewId, ReviewUpdate};
