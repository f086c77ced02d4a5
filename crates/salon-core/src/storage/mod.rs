//! Durable key-value storage used to mirror the session across restarts.
//!
//! This module provides:
//! - `KeyValueStore`: the string-keyed get/set/remove surface
//! - `MemoryStore`: process-local map, used in tests and as a fallback
//! - `FileStore`: JSON file in the cache directory, rewritten on every change
//! - `KeyringStore`: one OS keychain entry per key

pub mod error;
pub mod file;
pub mod keychain;
pub mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A string-keyed, string-valued store.
///
/// Writes must be durable by the time `set`/`remove` return. Removing a key
/// that is not present succeeds.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
