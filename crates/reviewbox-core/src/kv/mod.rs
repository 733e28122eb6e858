//! Device-local key-value storage
//!
//! Reviews, the device token, and the admin flag all live under string keys
//! holding whole string values, the same shape as a browser's local storage.
//! Every write replaces the full value; there are no partial updates.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

use crate::error::Result;

/// Key holding the JSON array of reviews, newest first.
pub const REVIEWS_KEY: &str = "massageReviews";
/// Key holding this device's ownership token.
pub const DEVICE_TOKEN_KEY: &str = "userToken";
/// Key holding the literal `"true"` while admin mode is unlocked.
pub const ADMIN_FLAG_KEY: &str = "isAdmin";

/// Trait for string key-value storage backends
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
