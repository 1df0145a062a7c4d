//! Periodic draft saving for one tracked form
//!
//! [`AutoSave`] holds the live value of a form and writes it to the durable
//! store when the interval elapses, when the window loses focus and right
//! before exit. Storage problems are logged and never returned: the form keeps
//! working without persistence.

use super::history::DraftHistory;
use super::types::{Draft, DraftPayload};
use crate::config::AppConfig;
use crate::storage::SharedStore;
use crate::utils::SharedClock;
use crate::ProseError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Called after every successful save
pub type SaveCallback<T> = Box<dyn FnMut(&Draft<T>) + Send>;

#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveOptions {
    /// Time between periodic saves
    pub interval: Duration,
    /// Also save when the window loses focus or is hidden
    pub save_on_blur: bool,
    /// Also save right before the application exits
    pub save_before_unload: bool,
    /// Number of past saves kept in the history list (0 disables it)
    pub history_limit: usize,
}

impl Default for AutoSaveOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            save_on_blur: true,
            save_before_unload: true,
            history_limit: 0,
        }
    }
}

impl From<&AppConfig> for AutoSaveOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            interval: config.autosave_interval(),
            save_on_blur: config.save_on_blur,
            save_before_unload: config.save_before_unload,
            history_limit: config.draft_history_limit,
        }
    }
}

/// What caused a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Interval,
    Blur,
    BeforeUnload,
    Manual,
    Restore,
}

/// Handle for a form registered for autosave
pub struct AutoSave<T: DraftPayload> {
    key: String,
    store: SharedStore,
    clock: SharedClock,
    options: AutoSaveOptions,
    on_save: Option<SaveCallback<T>>,
    /// Value the form was tracked with
    initial: T,
    current: T,
    /// Value as of the last successful save (or as first tracked)
    baseline: T,
    last_saved: Option<DateTime<Utc>>,
    /// Monotonic time of the next interval tick
    next_tick: Duration,
    is_saving: bool,
    failed_saves: u32,
}

impl<T: DraftPayload> AutoSave<T> {
    pub fn new(
        key: impl Into<String>,
        value: T,
        store: SharedStore,
        clock: SharedClock,
        options: AutoSaveOptions,
    ) -> Self {
        let key = key.into();
        let next_tick = clock.monotonic() + options.interval;
        debug!(key = %key, interval_ms = options.interval.as_millis() as u64, "Tracking draft");

        Self {
            key,
            store,
            clock,
            options,
            on_save: None,
            initial: value.clone(),
            baseline: value.clone(),
            current: value,
            last_saved: None,
            next_tick,
            is_saving: false,
            failed_saves: 0,
        }
    }

    /// Run `callback` after each successful save
    pub fn with_on_save(mut self, callback: impl FnMut(&Draft<T>) + Send + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &AutoSaveOptions {
        &self.options
    }

    pub fn value(&self) -> &T {
        &self.current
    }

    /// Edit the tracked value in place
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn update(&mut self, value: T) {
        self.current = value;
    }

    /// True only while a save is being written
    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.current != self.baseline
    }

    /// Saves that failed since the last successful one
    pub fn failed_saves(&self) -> u32 {
        self.failed_saves
    }

    /// Drive the interval timer. Returns true when a save was written.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.monotonic();
        if now < self.next_tick {
            return false;
        }

        // Missed ticks collapse into one
        self.next_tick = now + self.options.interval;

        if !self.has_unsaved_changes() {
            return false;
        }
        self.save(SaveTrigger::Interval)
    }

    /// The window lost focus
    pub fn on_blur(&mut self) -> bool {
        if !self.options.save_on_blur || !self.has_unsaved_changes() {
            return false;
        }
        self.save(SaveTrigger::Blur)
    }

    pub fn on_visibility_change(&mut self, visible: bool) -> bool {
        if visible {
            return false;
        }
        self.on_blur()
    }

    /// The application is about to exit
    pub fn before_unload(&mut self) -> bool {
        if !self.options.save_before_unload || !self.has_unsaved_changes() {
            return false;
        }
        self.save(SaveTrigger::BeforeUnload)
    }

    /// Save immediately, even without changes
    pub fn save_now(&mut self) -> bool {
        self.save(SaveTrigger::Manual)
    }

    fn save(&mut self, trigger: SaveTrigger) -> bool {
        self.is_saving = true;

        let draft = Draft::new(self.key.clone(), self.current.clone(), self.clock.now());
        let outcome = serde_json::to_string(&draft)
            .map_err(ProseError::from)
            .and_then(|json| self.store.set(&self.key, &json));

        self.is_saving = false;

        match outcome {
            Ok(()) => {
                self.baseline = draft.payload.clone();
                self.last_saved = Some(draft.saved_at);
                self.failed_saves = 0;
                debug!(key = %self.key, ?trigger, "Draft saved");

                if self.options.history_limit > 0 {
                    let history =
                        DraftHistory::new(self.store.as_ref(), &self.key, self.options.history_limit);
                    if let Err(e) = history.push(&draft) {
                        warn!(key = %self.key, error = %e, "Failed to append draft history");
                    }
                }

                if let Some(callback) = self.on_save.as_mut() {
                    callback(&draft);
                }
                true
            }
            Err(e) => {
                self.failed_saves += 1;
                if self.failed_saves == 1 {
                    warn!(key = %self.key, ?trigger, error = %e, "Draft save failed, continuing without persistence");
                } else {
                    debug!(key = %self.key, failures = self.failed_saves, error = %e, "Draft save failed again");
                }
                false
            }
        }
    }

    /// Remove the stored draft. Safe to call repeatedly.
    pub fn clear_draft(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to clear draft");
        }
    }

    /// Read the stored draft, or `None` if absent or unreadable
    pub fn recover_draft(&self) -> Option<Draft<T>> {
        super::read_draft(self.store.as_ref(), &self.key)
    }

    /// The stored draft, if it holds anything worth offering to the user
    pub fn recoverable(&self) -> Option<Draft<T>> {
        self.recover_draft().filter(|draft| draft.payload.has_content())
    }

    /// Adopt a recovered draft as the current value
    ///
    /// The store may already hold newer edits made while the recovery prompt
    /// was open, so the restored value is written back straight away. If that
    /// write fails it stays unsaved and the next trigger retries.
    pub fn restore(&mut self, draft: Draft<T>) {
        info!(key = %self.key, saved_at = %draft.saved_at, "Restoring draft");
        self.current = draft.payload;
        self.baseline = self.initial.clone();
        self.last_saved = None;
        self.save(SaveTrigger::Restore);
    }

    /// The user declined a recovered draft
    ///
    /// Removes the stored draft and its history. Anything typed since tracking
    /// began counts as unsaved again, so the next trigger stores it.
    pub fn discard(&mut self) {
        info!(key = %self.key, "Discarding draft");
        self.clear_draft();
        let history = DraftHistory::new(self.store.as_ref(), &self.key, self.options.history_limit);
        if let Err(e) = history.clear() {
            warn!(key = %self.key, error = %e, "Failed to clear draft history");
        }
        self.baseline = self.initial.clone();
        self.last_saved = None;
    }

    /// The value was saved elsewhere, so the draft is no longer needed
    pub fn commit(&mut self) {
        self.clear_draft();
        self.baseline = self.current.clone();
    }

    /// Past saves, newest first
    pub fn history(&self) -> Vec<Draft<T>> {
        DraftHistory::new(self.store.as_ref(), &self.key, self.options.history_limit).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::WritingDraft;
    use crate::storage::MemoryStore;
    use crate::utils::{Clock, ManualClock};
    use std::sync::Arc;

    fn tracker(store: &MemoryStore, clock: &ManualClock) -> AutoSave<WritingDraft> {
        AutoSave::new(
            "draft:writing:new",
            WritingDraft::default(),
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            AutoSaveOptions {
                interval: Duration::from_secs(10),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_no_save_before_interval() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        autosave.value_mut().content = "Once upon".into();
        clock.advance(Duration::from_secs(9));
        assert!(!autosave.poll());
        assert!(autosave.has_unsaved_changes());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unchanged_value_is_not_written() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        clock.advance(Duration::from_secs(30));
        assert!(!autosave.poll());
        assert!(!autosave.on_blur());
        assert!(!autosave.before_unload());
        assert!(autosave.last_saved().is_none());
    }

    #[test]
    fn test_blur_disabled() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = AutoSave::new(
            "draft:writing:new",
            WritingDraft::default(),
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            AutoSaveOptions {
                save_on_blur: false,
                ..Default::default()
            },
        );

        autosave.value_mut().title = "Title".into();
        assert!(!autosave.on_blur());
        assert!(!autosave.on_visibility_change(false));
        assert!(autosave.before_unload());
    }

    #[test]
    fn test_storage_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.set_disabled(true);
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        autosave.value_mut().content = "text".into();
        assert!(!autosave.save_now());
        assert!(!autosave.is_saving());
        assert_eq!(autosave.failed_saves(), 1);
        assert!(autosave.has_unsaved_changes());
        assert!(autosave.recover_draft().is_none());

        store.set_disabled(false);
        assert!(autosave.save_now());
        assert_eq!(autosave.failed_saves(), 0);
    }

    #[test]
    fn test_interval_survives_wall_clock_jump_back() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        autosave.value_mut().content = "draft".into();
        clock.set(clock.now() - chrono::Duration::hours(1));
        clock.advance(Duration::from_secs(10));
        assert!(autosave.poll());
        assert!(!autosave.has_unsaved_changes());
    }

    #[test]
    fn test_discard_keeps_later_edits_unsaved() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        autosave.value_mut().content = "typed after start".into();
        clock.advance(Duration::from_secs(10));
        assert!(autosave.poll());

        autosave.discard();
        assert!(autosave.recover_draft().is_none());
        assert!(autosave.last_saved().is_none());
        assert!(autosave.has_unsaved_changes());

        assert!(autosave.before_unload());
        assert_eq!(autosave.recover_draft().unwrap().payload.content, "typed after start");
    }

    #[test]
    fn test_restore_overwrites_newer_stored_edits() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        let old = Draft::new(
            "draft:writing:new",
            WritingDraft {
                title: "Old title".into(),
                ..Default::default()
            },
            clock.now(),
        );
        autosave.value_mut().title = "Typed meanwhile".into();
        autosave.save_now();

        autosave.restore(old);
        assert_eq!(autosave.value().title, "Old title");
        assert!(!autosave.has_unsaved_changes());
        assert_eq!(autosave.recover_draft().unwrap().payload.title, "Old title");
    }

    #[test]
    fn test_commit_clears_and_rebases() {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let mut autosave = tracker(&store, &clock);

        autosave.value_mut().content = "final".into();
        autosave.save_now();
        autosave.value_mut().content = "final!".into();
        autosave.commit();

        assert!(!autosave.has_unsaved_changes());
        assert!(autosave.recover_draft().is_none());
    }
}
