//! Durable key-value storage
//!
//! Drafts and recorded sessions live in a process-wide string store keyed by
//! caller-chosen keys. Writes are whole-value overwrites, so the last writer
//! wins and a reader never sees a partially written value.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;
use std::sync::Arc;

/// Synchronous string key-value store
///
/// Every method may fail with [`crate::ProseError::StorageFailure`], for
/// example when a quota is exceeded or storage is disabled.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

pub type SharedStore = Arc<dyn DurableStore>;
