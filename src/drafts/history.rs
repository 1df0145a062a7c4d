use super::types::{Draft, DraftPayload};
use crate::storage::DurableStore;
use crate::Result;
use tracing::warn;

pub const HISTORY_KEY_PREFIX: &str = "history:";

/// Storage key of a draft's history list. Lives outside the draft namespace so
/// no entity id can collide with it.
pub fn history_key(draft_key: &str) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, draft_key)
}

/// Bounded list of past saves for one draft key, newest first
pub struct DraftHistory<'a> {
    store: &'a dyn DurableStore,
    key: String,
    limit: usize,
}

impl<'a> DraftHistory<'a> {
    pub fn new(store: &'a dyn DurableStore, draft_key: &str, limit: usize) -> Self {
        Self {
            store,
            key: history_key(draft_key),
            limit,
        }
    }

    /// Read the history. Unreadable lists count as empty.
    pub fn load<T: DraftPayload>(&self) -> Vec<Draft<T>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read draft history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Draft<T>>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable draft history");
                Vec::new()
            }
        }
    }

    /// Prepend a saved draft and drop entries past the limit
    pub fn push<T: DraftPayload>(&self, draft: &Draft<T>) -> Result<()> {
        let mut entries = self.load::<T>();
        entries.insert(0, draft.clone());
        entries.truncate(self.limit);

        let json = serde_json::to_string(&entries)?;
        self.store.set(&self.key, &json)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}
