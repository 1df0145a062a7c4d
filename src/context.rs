//! Shared application context
//!
//! Created once at start-up and passed to every controller that needs the
//! durable store, the clock, the asset registry or the notice queue.

use crate::assets::AssetRegistry;
use crate::capture::{CaptureDevice, Recorder, SessionLibrary, RECORDINGS_KEY};
use crate::config::AppConfig;
use crate::drafts::{AutoSaveOptions, DraftManager};
use crate::notices::Notices;
use crate::playback::{MediaElement, Player};
use crate::storage::{FileStore, MemoryStore, SharedStore};
use crate::utils::{SharedClock, SystemClock};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: SharedStore,
    pub clock: SharedClock,
    pub assets: AssetRegistry,
    pub notices: Notices,
}

impl AppContext {
    /// Build a context over explicit collaborators
    pub fn with_parts(config: AppConfig, store: SharedStore, clock: SharedClock) -> Self {
        let notices = Notices::new(config.notice_limit);
        Self {
            config,
            store,
            clock,
            assets: AssetRegistry::new(),
            notices,
        }
    }

    /// Open the configured store. If the data directory is unusable the
    /// application still starts, keeping drafts in memory only.
    pub fn open(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let store: SharedStore = match &config.data_dir {
            Some(dir) => match FileStore::open(dir) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Durable store unavailable, drafts will not survive restarts");
                    Arc::new(MemoryStore::new())
                }
            },
            None => Arc::new(MemoryStore::new()),
        };

        info!("Application context ready");
        Ok(Self::with_parts(config, store, Arc::new(SystemClock::new())))
    }

    pub fn drafts(&self) -> DraftManager {
        DraftManager::new(
            self.store.clone(),
            self.clock.clone(),
            AutoSaveOptions::from(&self.config),
        )
    }

    /// The persisted recording list
    pub fn session_library(&self) -> SessionLibrary {
        SessionLibrary::persistent(
            self.store.clone(),
            RECORDINGS_KEY,
            self.config.recordings_limit,
            &self.assets,
        )
    }

    pub fn recorder(&self, device: Box<dyn CaptureDevice>) -> Recorder {
        Recorder::new(
            device,
            self.session_library(),
            self.assets.clone(),
            self.notices.clone(),
            self.clock.clone(),
        )
    }

    pub fn player(&self, element: Box<dyn MediaElement>) -> Player {
        Player::new(
            element,
            self.notices.clone(),
            self.config.default_volume,
            self.config.seek_step_secs,
        )
    }

    /// Final teardown, after every controller has released its device.
    /// Assets still live here belong to the recording list.
    pub fn shutdown(&self) {
        info!(live_assets = self.assets.live_count(), "Application context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::{draft_key, WritingDraft};
    use crate::storage::DurableStore;

    #[test]
    fn test_open_in_memory() {
        let context = AppContext::open(AppConfig::default().in_memory()).unwrap();
        let drafts = context.drafts();
        let mut autosave = drafts.track_default(draft_key("writing", None), WritingDraft::default());
        autosave.value_mut().title = "Hello".into();
        assert!(autosave.save_now());
        assert!(drafts.recover::<WritingDraft>("draft:writing:new").is_some());
    }

    #[test]
    fn test_open_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let context = AppContext::open(AppConfig::default().with_data_dir(dir.path())).unwrap();
        context.store.set("probe", "1").unwrap();
        let files = std::fs::read_dir(dir.path().join("entries")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AppConfig {
            recordings_limit: 0,
            ..AppConfig::default()
        };
        assert!(AppContext::open(config).is_err());
    }
}
