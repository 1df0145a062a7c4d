//! Draft persistence
//!
//! Keeps a recoverable copy of unsaved form input in the durable store and
//! offers it back on the next start.
//!
//! Keys must be unique per logical form instance; use [`draft_key`] with the
//! entity id so two open forms never overwrite each other.

pub mod autosave;
pub mod history;
pub mod types;

pub use autosave::{AutoSave, AutoSaveOptions, SaveCallback, SaveTrigger};
pub use history::{history_key, DraftHistory, HISTORY_KEY_PREFIX};
pub use types::{Draft, DraftPayload, PracticeDraft, SpeechDraft, WritingDraft, DRAFT_FORMAT_VERSION};

use crate::storage::{DurableStore, SharedStore};
use crate::utils::SharedClock;
use tracing::{debug, warn};

pub const DRAFT_KEY_PREFIX: &str = "draft:";

/// Storage key for a form of `kind`, scoped to an entity when editing one
pub fn draft_key(kind: &str, entity_id: Option<&str>) -> String {
    format!("{}{}:{}", DRAFT_KEY_PREFIX, kind, entity_id.unwrap_or("new"))
}

/// Read and validate a stored draft. Never fails: problems read as absent.
pub(crate) fn read_draft<T: DraftPayload>(store: &dyn DurableStore, key: &str) -> Option<Draft<T>> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read draft");
            return None;
        }
    };

    let draft: Draft<T> = match serde_json::from_str(&raw) {
        Ok(draft) => draft,
        Err(e) => {
            warn!(key = %key, error = %e, "Ignoring unreadable draft");
            return None;
        }
    };

    if let Err(reason) = draft.validate_for(key) {
        warn!(key = %key, %reason, "Ignoring invalid draft");
        return None;
    }

    Some(draft)
}

/// Creates autosave handles over the shared store
#[derive(Clone)]
pub struct DraftManager {
    store: SharedStore,
    clock: SharedClock,
    defaults: AutoSaveOptions,
}

impl DraftManager {
    pub fn new(store: SharedStore, clock: SharedClock, defaults: AutoSaveOptions) -> Self {
        Self {
            store,
            clock,
            defaults,
        }
    }

    pub fn defaults(&self) -> &AutoSaveOptions {
        &self.defaults
    }

    /// Register `value` for autosave under `key`
    pub fn track<T: DraftPayload>(
        &self,
        key: impl Into<String>,
        value: T,
        options: AutoSaveOptions,
    ) -> AutoSave<T> {
        AutoSave::new(key, value, self.store.clone(), self.clock.clone(), options)
    }

    /// Register with the default options
    pub fn track_default<T: DraftPayload>(&self, key: impl Into<String>, value: T) -> AutoSave<T> {
        self.track(key, value, self.defaults.clone())
    }

    pub fn recover<T: DraftPayload>(&self, key: &str) -> Option<Draft<T>> {
        read_draft(self.store.as_ref(), key)
    }

    pub fn clear(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key = %key, error = %e, "Failed to clear draft");
        }
    }

    /// Keys of every stored draft
    pub fn stored_keys(&self) -> Vec<String> {
        match self.store.keys_with_prefix(DRAFT_KEY_PREFIX) {
            Ok(keys) => {
                debug!(count = keys.len(), "Listed stored drafts");
                keys
            }
            Err(e) => {
                warn!(error = %e, "Failed to list drafts");
                Vec::new()
            }
        }
    }
}
