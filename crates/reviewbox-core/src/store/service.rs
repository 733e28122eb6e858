//! Shared review store handle used by the CLI and the relay agent.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::ReviewStore;
use crate::error::Result;
use crate::kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::models::{DeviceToken, NewReview, Review, ReviewId, ReviewUpdate, Role};
use crate::session::{AdminGate, Session};

/// Cloneable, thread-safe handle to one [`ReviewStore`].
///
/// Each method holds the lock for exactly one store call, so a sweep and a
/// foreground edit never interleave inside a read-modify-write.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<Mutex<ReviewStore>>,
}

impl ReviewService {
    pub fn new(store: ReviewStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Wrap any backend with the default clock and date format.
    pub fn from_kv(kv: impl KeyValueStore + 'static) -> Self {
        let kv: Box<dyn KeyValueStore> = Box::new(kv);
        Self::new(ReviewStore::new(kv))
    }

    /// Open a SQLite-backed service at the given filesystem path.
    pub fn open_path(db_path: impl AsRef<Path>, date_format: &str) -> Result<Self> {
        let kv: Box<dyn KeyValueStore> = Box::new(SqliteKeyValueStore::open(db_path)?);
        Ok(Self::new(
            ReviewStore::new(kv).with_date_format(date_format),
        ))
    }

    /// Open an in-memory service (primarily for tests).
    pub fn open_in_memory() -> Self {
        Self::from_kv(MemoryKeyValueStore::new())
    }

    pub async fn open_session(&self) -> Result<Session> {
        self.store.lock().await.open_session()
    }

    pub async fn unlock_admin(
        &self,
        gate: &AdminGate,
        session: &mut Session,
        presented: &str,
    ) -> Result<()> {
        self.store
            .lock()
            .await
            .unlock_admin(gate, session, presented)
    }

    pub async fn lock_admin(&self, session: &mut Session) -> Result<()> {
        self.store.lock().await.lock_admin(session)
    }

    /// List reviews newest-first.
    pub async fn list(&self) -> Vec<Review> {
        self.store.lock().await.list()
    }

    pub async fn get(&self, id: ReviewId) -> Option<Review> {
        self.store.lock().await.get(id)
    }

    /// Reviews still waiting for relay confirmation.
    pub async fn pending(&self) -> Vec<Review> {
        self.store.lock().await.pending()
    }

    pub async fn create(&self, candidate: NewReview, session: &Session) -> Result<Review> {
        self.store.lock().await.create(candidate, session)
    }

    pub async fn update(
        &self,
        id: ReviewId,
        update: ReviewUpdate,
        role: Role,
    ) -> Result<Option<Review>> {
        self.store.lock().await.update(id, update, role)
    }

    pub async fn delete(&self, id: ReviewId, token: &DeviceToken, role: Role) -> Result<Review> {
        self.store.lock().await.delete(id, token, role)
    }

    pub async fn clear_all(&self, role: Role) -> Result<usize> {
        self.store.lock().await.clear_all(role)
    }

    pub async fn set_sync_flag(&self, id: ReviewId, value: bool) -> Result<bool> {
        self.store.lock().await.set_sync_flag(id, value)
    }
}
