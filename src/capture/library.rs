use super::session::{CaptureSession, StoredAudio, StoredSession};
use crate::assets::{AssetRegistry, AssetSource};
use crate::storage::SharedStore;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default storage key of the recording list
pub const RECORDINGS_KEY: &str = "recordings";

/// Finished recordings, most recent first, bounded to `limit`
///
/// When backed by a store, the list key holds only session metadata and each
/// recording's audio lives under `<key>:<session id>`. Adding or removing a
/// session writes that session's audio entry and the small list, never the
/// audio of the others. Write failures are logged and the in-memory list stays
/// authoritative.
pub struct SessionLibrary {
    sessions: VecDeque<CaptureSession>,
    limit: usize,
    store: Option<SharedStore>,
    key: String,
    /// Metadata of the sessions whose audio is in the store
    stored: HashMap<Uuid, StoredSession>,
}

impl SessionLibrary {
    /// A library that lives only in memory
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: VecDeque::new(),
            limit: limit.max(1),
            store: None,
            key: RECORDINGS_KEY.to_string(),
            stored: HashMap::new(),
        }
    }

    /// Open a library persisted under `key`, loading what is stored there
    pub fn persistent(
        store: SharedStore,
        key: impl Into<String>,
        limit: usize,
        assets: &AssetRegistry,
    ) -> Self {
        let mut library = Self {
            sessions: VecDeque::new(),
            limit: limit.max(1),
            store: Some(store),
            key: key.into(),
            stored: HashMap::new(),
        };
        library.load(assets);
        library
    }

    fn audio_key(&self, id: Uuid) -> String {
        format!("{}:{}", self.key, id)
    }

    fn load(&mut self, assets: &AssetRegistry) {
        let Some(store) = self.store.clone() else {
            return;
        };

        let raw = match store.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read recordings");
                return;
            }
        };

        let parsed = raw.as_deref().map(serde_json::from_str::<Vec<serde_json::Value>>);
        let entries = match parsed {
            None => Vec::new(),
            Some(Ok(entries)) => entries,
            Some(Err(e)) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable recording list");
                Vec::new()
            }
        };

        // Entries are decoded one by one so a single bad one is skipped
        for entry in entries.into_iter().take(self.limit) {
            let stored = match serde_json::from_value::<StoredSession>(entry) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable recording");
                    continue;
                }
            };
            match stored.clone().decode(store.as_ref(), assets) {
                Ok(session) => {
                    self.stored.insert(session.id, stored);
                    self.sessions.push_back(session);
                }
                Err(e) => warn!(session_id = %stored.id, error = %e, "Skipping unreadable recording"),
            }
        }

        self.remove_orphaned_audio();
        info!(count = self.sessions.len(), "Loaded recordings");
    }

    /// Drop audio entries that no listed session refers to, such as those left
    /// by a crash between writing the audio and the list
    fn remove_orphaned_audio(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let prefix = format!("{}:", self.key);
        let keys = match store.keys_with_prefix(&prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list recording audio");
                return;
            }
        };

        for key in keys {
            let referenced = self.stored.values().any(
                |stored| matches!(&stored.audio, StoredAudio::Entry { key: k } if *k == key),
            );
            if referenced {
                continue;
            }
            debug!(key = %key, "Removing orphaned recording audio");
            if let Err(e) = store.remove(&key) {
                warn!(key = %key, error = %e, "Failed to remove orphaned recording audio");
            }
        }
    }

    /// Write the session's audio to its own entry and remember its metadata
    fn store_session(&mut self, session: &CaptureSession) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let audio = match session.asset.source() {
            AssetSource::Clip(clip) => {
                let key = self.audio_key(session.id);
                let written = clip.to_base64().and_then(|encoded| store.set(&key, &encoded));
                if let Err(e) = written {
                    warn!(session_id = %session.id, error = %e, "Failed to save recording audio");
                    return false;
                }
                StoredAudio::Entry { key }
            }
            AssetSource::Remote(url) => StoredAudio::Remote { url: url.clone() },
        };

        self.stored.insert(session.id, StoredSession::new(session, audio));
        true
    }

    /// Forget a session's stored metadata and delete its audio entry
    fn unstore_session(&mut self, id: Uuid) -> bool {
        let Some(stored) = self.stored.remove(&id) else {
            return false;
        };

        if let (Some(store), StoredAudio::Entry { key }) = (&self.store, &stored.audio) {
            if let Err(e) = store.remove(key) {
                warn!(key = %key, error = %e, "Failed to delete recording audio");
            }
        }
        true
    }

    /// Rewrite the list of stored sessions. Holds no audio.
    fn persist_list(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let list: Vec<&StoredSession> = self
            .sessions
            .iter()
            .filter_map(|session| self.stored.get(&session.id))
            .collect();

        let result = serde_json::to_string(&list)
            .map_err(crate::ProseError::from)
            .and_then(|json| store.set(&self.key, &json));

        match result {
            Ok(()) => debug!(count = list.len(), "Recordings saved"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to save recordings"),
        }
    }

    /// Add a session at the front, dropping the oldest past the limit
    pub fn add(&mut self, session: CaptureSession) {
        info!(session_id = %session.id, label = %session.source_label, "Recording added");
        let mut changed = self.store_session(&session);
        self.sessions.push_front(session);

        while self.sessions.len() > self.limit {
            if let Some(evicted) = self.sessions.pop_back() {
                debug!(session_id = %evicted.id, "Oldest recording dropped");
                changed |= self.unstore_session(evicted.id);
            }
        }

        if changed {
            self.persist_list();
        }
    }

    /// Delete a session, releasing its audio. Returns false if unknown.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.id != id);
        let removed = self.sessions.len() != before;

        if removed {
            info!(session_id = %id, "Recording deleted");
            if self.unstore_session(id) {
                self.persist_list();
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        let ids: Vec<Uuid> = self.sessions.drain(..).map(|session| session.id).collect();
        for id in ids {
            self.unstore_session(id);
        }
        self.persist_list();
    }

    pub fn get(&self, id: Uuid) -> Option<&CaptureSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn latest(&self) -> Option<&CaptureSession> {
        self.sessions.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptureSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
