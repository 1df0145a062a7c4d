//! Application state behind the egui components
//!
//! Owns the controllers for one window: the two tracked forms, the recorder,
//! the player and the platform share targets. Components call the methods
//! here; nothing in this module touches egui.

use crate::capture::{CaptureDevice, CaptureSession, Recorder, StartOutcome, UnavailableDevice};
use crate::context::AppContext;
use crate::drafts::{draft_key, AutoSave, Draft, DraftPayload, SpeechDraft, WritingDraft};
use crate::notices::NoticeLevel;
use crate::playback::{MediaElement, Player, TimelineElement, TransportKey};
use crate::share::{
    export_wav, share_or_copy, Clipboard, MemoryClipboard, NoShareSheet, ShareOutcome, SharePayload,
    ShareSheet,
};
use crate::ProseError;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Label used when a recording is started without a topic
const UNTITLED_RECORDING: &str = "Untitled recording";

/// Host services the state is built over
pub struct Platform {
    pub device: Box<dyn CaptureDevice>,
    pub element: Box<dyn MediaElement>,
    pub share_sheet: Box<dyn ShareSheet>,
    pub clipboard: Box<dyn Clipboard>,
}

impl Platform {
    /// No audio hardware: recording reports the device as unavailable and
    /// playback follows the clock silently
    pub fn headless(context: &AppContext) -> Self {
        Self {
            device: Box::new(UnavailableDevice),
            element: Box::new(TimelineElement::new(context.clock.clone())),
            share_sheet: Box::new(NoShareSheet),
            clipboard: Box::new(MemoryClipboard::default()),
        }
    }
}

/// The forms that offer draft recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftForm {
    Writing,
    Speech,
}

/// The user's answer to a recovery prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    Keep,
    Discard,
}

pub struct AppState {
    pub context: AppContext,
    /// The writing editor
    pub writing: AutoSave<WritingDraft>,
    /// Topic and notes for the next recording
    pub speech: AutoSave<SpeechDraft>,
    /// Drafts found at start-up, waiting for the user to keep or discard them
    pub recovered_writing: Option<Draft<WritingDraft>>,
    pub recovered_speech: Option<Draft<SpeechDraft>>,
    pub recorder: Recorder,
    pub player: Player,
    share_sheet: Box<dyn ShareSheet>,
    clipboard: Box<dyn Clipboard>,
    /// Where exported recordings and saved writing go
    pub export_dir: PathBuf,
    window_focused: bool,
    shut_down: bool,
}

impl AppState {
    pub fn new(context: AppContext, platform: Platform) -> Self {
        let drafts = context.drafts();
        let writing = drafts.track_default(draft_key(WritingDraft::KIND, None), WritingDraft::default());
        let speech = drafts.track_default(draft_key(SpeechDraft::KIND, None), SpeechDraft::default());

        let recovered_writing = writing.recoverable();
        let recovered_speech = speech.recoverable();
        if recovered_writing.is_some() || recovered_speech.is_some() {
            info!(
                writing = recovered_writing.is_some(),
                speech = recovered_speech.is_some(),
                "Found drafts from a previous session"
            );
        }

        let export_dir = context
            .config
            .data_dir
            .as_ref()
            .map(|dir| dir.join("exports"))
            .unwrap_or_else(std::env::temp_dir);

        Self {
            recorder: context.recorder(platform.device),
            player: context.player(platform.element),
            share_sheet: platform.share_sheet,
            clipboard: platform.clipboard,
            writing,
            speech,
            recovered_writing,
            recovered_speech,
            export_dir,
            window_focused: true,
            shut_down: false,
            context,
        }
    }

    /// State without audio hardware or a system clipboard
    pub fn headless(context: AppContext) -> Self {
        let platform = Platform::headless(&context);
        Self::new(context, platform)
    }

    /// Drive timers, device answers and media callbacks. Call once per frame.
    pub fn poll(&mut self) {
        self.writing.poll();
        self.speech.poll();
        self.recorder.poll();
        self.player.poll();
    }

    pub fn has_pending_recovery(&self) -> bool {
        self.recovered_writing.is_some() || self.recovered_speech.is_some()
    }

    pub fn resolve_recovery(&mut self, form: DraftForm, choice: RecoveryChoice) {
        match (form, choice) {
            (DraftForm::Writing, RecoveryChoice::Keep) => {
                if let Some(draft) = self.recovered_writing.take() {
                    self.writing.restore(draft);
                }
            }
            (DraftForm::Writing, RecoveryChoice::Discard) => {
                if self.recovered_writing.take().is_some() {
                    self.writing.discard();
                }
            }
            (DraftForm::Speech, RecoveryChoice::Keep) => {
                if let Some(draft) = self.recovered_speech.take() {
                    self.speech.restore(draft);
                }
            }
            (DraftForm::Speech, RecoveryChoice::Discard) => {
                if self.recovered_speech.take().is_some() {
                    self.speech.discard();
                }
            }
        }
    }

    /// The window gained or lost focus
    pub fn window_focus_changed(&mut self, focused: bool) {
        if focused == self.window_focused {
            return;
        }
        self.window_focused = focused;

        if !focused {
            debug!("Window lost focus");
            self.writing.on_blur();
            self.speech.on_blur();
        }
    }

    /// Player shortcuts. Ignored while a text field has focus.
    pub fn handle_key(&mut self, key: TransportKey, text_input_focused: bool) -> bool {
        self.player.handle_key(key, text_input_focused)
    }

    /// Start a recording for the current topic, or finish the running one and
    /// load it into the player
    pub fn toggle_recording(&mut self) {
        if self.recorder.is_active() {
            if let Some(session) = self.recorder.stop() {
                self.player.load(session.asset.clone());
            }
            return;
        }

        let topic = self.speech.value().topic.trim();
        let label = if topic.is_empty() {
            UNTITLED_RECORDING.to_string()
        } else {
            topic.to_string()
        };

        if self.recorder.start(label) == StartOutcome::AlreadyActive {
            debug!("Record pressed while a recording is active");
        }
    }

    fn session(&self, id: Uuid) -> Option<CaptureSession> {
        self.recorder.library().get(id).cloned()
    }

    fn is_loaded(&self, session: &CaptureSession) -> bool {
        self.player.asset().map(|asset| asset.id()) == Some(session.asset.id())
    }

    /// Play a recording, or toggle it when it is already loaded
    pub fn play_session(&mut self, id: Uuid) {
        let Some(session) = self.session(id) else {
            warn!(session_id = %id, "Unknown recording");
            return;
        };

        if self.is_loaded(&session) {
            self.player.toggle();
        } else {
            self.player.load(session.asset);
            self.player.play();
        }
    }

    pub fn delete_session(&mut self, id: Uuid) -> bool {
        if let Some(session) = self.session(id) {
            if self.is_loaded(&session) {
                self.player.unload();
            }
        }
        self.recorder.delete(id)
    }

    pub fn share_session(&mut self, id: Uuid) -> Option<ShareOutcome> {
        let session = self.session(id)?;
        let payload = SharePayload::for_asset(&session.asset, session.source_label.clone());

        let outcome = share_or_copy(
            self.share_sheet.as_mut(),
            self.clipboard.as_mut(),
            &payload,
            &self.context.notices,
        );
        if outcome == ShareOutcome::Copied {
            self.context.notices.push(NoticeLevel::Info, "Link copied to clipboard");
        }
        Some(outcome)
    }

    /// Write a recording to the export directory as WAV
    pub fn export_session(&mut self, id: Uuid) -> Option<PathBuf> {
        let session = self.session(id)?;
        let file_name = format!(
            "{}-{}.wav",
            slug(&session.source_label),
            session.created_at.format("%Y%m%d-%H%M%S")
        );
        let path = self.export_dir.join(file_name);

        match export_wav(&session.asset, &path) {
            Ok(()) => {
                self.context
                    .notices
                    .push(NoticeLevel::Info, format!("Exported to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "Export failed");
                self.context.notices.report(&e);
                None
            }
        }
    }

    /// Save the writing as a Markdown file. The draft is no longer needed
    /// afterwards and is cleared.
    pub fn save_writing(&mut self) -> Option<PathBuf> {
        let writing = self.writing.value().clone();
        let path = self.export_dir.join(format!("{}.md", slug(&writing.title)));

        let mut text = format!("# {}\n\n", writing.title.trim());
        if !writing.author.trim().is_empty() {
            text.push_str(&format!("_{}_\n\n", writing.author.trim()));
        }
        text.push_str(&writing.content);
        text.push('\n');

        let result = fs::create_dir_all(&self.export_dir).and_then(|()| fs::write(&path, text));
        match result {
            Ok(()) => {
                info!(path = %path.display(), "Writing saved");
                self.writing.commit();
                self.context
                    .notices
                    .push(NoticeLevel::Info, format!("Saved to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to save writing");
                self.context.notices.report(&ProseError::from(e));
                None
            }
        }
    }

    /// Save pending drafts and release devices. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.writing.before_unload();
        self.speech.before_unload();
        self.player.unload();
        self.recorder.shutdown();
        self.context.shutdown();
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// File-name friendly version of a title
fn slug(title: &str) -> String {
    let slug: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("  My First Speech! "), "my-first-speech");
        assert_eq!(slug("???"), "untitled");
        assert_eq!(slug(""), "untitled");
    }
}
