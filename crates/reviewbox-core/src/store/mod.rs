//! Review store
//!
//! The whole collection lives under one key as a JSON array, newest first.
//! Every operation reads the full array, changes it in memory, and writes the
//! full array back, so each call is one whole-collection transaction.

mod clock;
mod service;

pub use clock::{format_display_date, Clock, SystemClock, DEFAULT_DATE_FORMAT};
pub use service::ReviewService;

use crate::error::{Error, Result};
use crate::kv::{KeyValueStore, REVIEWS_KEY};
use crate::models::{DeviceToken, NewReview, Review, ReviewId, ReviewUpdate, Role};
use crate::session::{AdminGate, Session};

/// What the acting session may do with a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub can_edit: bool,
    pub can_delete: bool,
    /// Written from this device
    pub is_own: bool,
}

impl Permissions {
    /// Capability flags for rendering a review card.
    pub fn for_review(review: &Review, session: &Session) -> Self {
        let is_own = review.is_owned_by(session.device_token());
        Self {
            can_edit: session.is_privileged(),
            can_delete: session.is_privileged() || is_own,
            is_own,
        }
    }
}

/// Ordered review collection over a key-value backend
pub struct ReviewStore<S: KeyValueStore = Box<dyn KeyValueStore>> {
    kv: S,
    clock: Box<dyn Clock>,
    date_format: String,
}

impl<S: KeyValueStore> ReviewStore<S> {
    /// Create a store over `kv` using the wall clock and the default date format
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            clock: Box::new(SystemClock),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Load this device's session, initializing the device token on first run
    pub fn open_session(&mut self) -> Result<Session> {
        let now = self.clock.now().timestamp_millis();
        Session::load_or_init(&mut self.kv, now)
    }

    pub fn unlock_admin(
        &mut self,
        gate: &AdminGate,
        session: &mut Session,
        presented: &str,
    ) -> Result<()> {
        gate.unlock(&mut self.kv, session, presented)
    }

    pub fn lock_admin(&mut self, session: &mut Session) -> Result<()> {
        AdminGate::lock(&mut self.kv, session)
    }

    /// All reviews, newest first.
    ///
    /// Never fails: an unreadable backend or malformed JSON reads as empty.
    pub fn list(&self) -> Vec<Review> {
        self.load().unwrap_or_else(|error| {
            tracing::warn!("Failed to read reviews; treating as empty: {}", error);
            Vec::new()
        })
    }

    /// Collection for a read-modify-write. Backend errors propagate so a
    /// failed read never gets written back as an empty array; only malformed
    /// JSON reads as empty.
    fn load(&self) -> Result<Vec<Review>> {
        let Some(raw) = self.kv.get(REVIEWS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Review>>(&raw) {
            Ok(reviews) => Ok(reviews),
            Err(error) => {
                tracing::warn!("Stored reviews are corrupt; treating as empty: {}", error);
                Ok(Vec::new())
            }
        }
    }

    pub fn get(&self, id: ReviewId) -> Option<Review> {
        self.list().into_iter().find(|review| review.id == id)
    }

    /// Reviews not yet confirmed by the relay endpoint, newest first
    pub fn pending(&self) -> Vec<Review> {
        self.list()
            .into_iter()
            .filter(|review| !review.synced)
            .collect()
    }

    /// Prepend a new review owned by `session`'s device.
    ///
    /// The candidate is trusted: required fields are checked by
    /// [`crate::ReviewDraft::validate`] before it reaches the store.
    pub fn create(&mut self, candidate: NewReview, session: &Session) -> Result<Review> {
        let now = self.clock.now();
        let millis = now.timestamp_millis();

        let review = Review {
            id: ReviewId::from_millis(millis),
            name: candidate.name,
            service: candidate.service,
            rating: candidate.rating,
            text: candidate.text,
            date: format_display_date(now, &self.date_format),
            timestamp: millis,
            owner_token: session.device_token().clone(),
            synced: false,
        };

        let mut reviews = self.load()?;
        reviews.insert(0, review.clone());
        self.persist(&reviews)?;

        tracing::info!("Created review {} ({} total)", review.id, reviews.len());
        Ok(review)
    }

    /// Merge `update` into a review. Privileged only.
    ///
    /// A standard role or an unknown id is a silent no-op returning `None`.
    /// A blank `name` or `text` is a validation error.
    pub fn update(
        &mut self,
        id: ReviewId,
        update: ReviewUpdate,
        role: Role,
    ) -> Result<Option<Review>> {
        if !role.is_privileged() {
            tracing::debug!("Ignoring update of review {id} from non-admin session");
            return Ok(None);
        }
        let update = update.validate()?;

        let mut reviews = self.load()?;
        let Some(review) = reviews.iter_mut().find(|review| review.id == id) else {
            tracing::debug!("Ignoring update of unknown review {id}");
            return Ok(None);
        };

        let now = self.clock.now();
        update.apply_to(review);
        review.date = format_display_date(now, &self.date_format);
        review.timestamp = now.timestamp_millis();
        let updated = review.clone();

        self.persist(&reviews)?;
        tracing::info!("Updated review {id}");
        Ok(Some(updated))
    }

    /// Remove one review.
    ///
    /// Allowed for a privileged role or for the device that wrote it.
    pub fn delete(&mut self, id: ReviewId, token: &DeviceToken, role: Role) -> Result<Review> {
        let mut reviews = self.load()?;
        let position = reviews.iter().position(|review| review.id == id);

        let authorized = role.is_privileged()
            || position.is_some_and(|index| reviews[index].is_owned_by(token));
        if !authorized {
            tracing::warn!("Rejected delete of review {id}: not the owner");
            return Err(Error::Unauthorized(
                "You can only delete your own reviews".to_string(),
            ));
        }

        let Some(index) = position else {
            return Err(Error::NotFound(id));
        };

        let removed = reviews.remove(index);
        self.persist(&reviews)?;
        tracing::info!("Deleted review {id}");
        Ok(removed)
    }

    /// Remove every review in a single write. Privileged only.
    pub fn clear_all(&mut self, role: Role) -> Result<usize> {
        if !role.is_privileged() {
            tracing::warn!("Rejected clear of all reviews from non-admin session");
            return Err(Error::Unauthorized(
                "Only an administrator can delete all reviews".to_string(),
            ));
        }

        let count = self.list().len();
        self.kv.remove(REVIEWS_KEY)?;
        tracing::info!("Cleared {count} reviews");
        Ok(count)
    }

    /// Set the relay flag on one review, leaving every other field alone.
    ///
    /// Returns whether the review was found.
    pub fn set_sync_flag(&mut self, id: ReviewId, value: bool) -> Result<bool> {
        let mut reviews = self.load()?;
        let Some(review) = reviews.iter_mut().find(|review| review.id == id) else {
            return Ok(false);
        };

        if review.synced == value {
            return Ok(true);
        }
        review.synced = value;
        self.persist(&reviews)?;
        Ok(true)
    }

    fn persist(&mut self, reviews: &[Review]) -> Result<()> {
        let serialized = serde_json::to_string(reviews)?;
        self.kv.set(REVIEWS_KEY, &serialized)
    }
}
