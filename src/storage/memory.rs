use super::DurableStore;
use crate::{ProseError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl Inner {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

/// In-process store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::new();
        store.inner.write().quota_bytes = Some(bytes);
        store
    }

    /// Make every operation fail, as when the platform disables storage
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.write().disabled = disabled;
    }

    /// Write a raw value, bypassing quota and disabled checks
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner.write().entries.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read();
        if inner.disabled {
            return Err(ProseError::StorageFailure("storage is disabled".into()));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.disabled {
            return Err(ProseError::StorageFailure("storage is disabled".into()));
        }

        if let Some(quota) = inner.quota_bytes {
            let replaced = inner.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let projected = inner.used_bytes() - replaced + key.len() + value.len();
            if projected > quota {
                return Err(ProseError::StorageFailure(format!(
                    "quota exceeded: {} of {} bytes",
                    projected, quota
                )));
            }
        }

        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.disabled {
            return Err(ProseError::StorageFailure("storage is disabled".into()));
        }
        inner.entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.inner.read();
        if inner.disabled {
            return Err(ProseError::StorageFailure("storage is disabled".into()));
        }
        Ok(inner
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
