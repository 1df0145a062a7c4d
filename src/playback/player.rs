use super::element::{MediaElement, MediaEvent, PlayRequest};
use super::keys::TransportKey;
use crate::assets::AssetHandle;
use crate::notices::Notices;
use crate::utils::{poll_completion, CompletionState};
use crate::ProseError;
use tracing::{debug, info, warn};

/// Coarse transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Nothing loaded
    Empty,
    Paused,
    Playing,
}

/// Snapshot of the transport for display
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub asset_ref: Option<String>,
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f32,
}

impl PlaybackState {
    /// Playback progress as a fraction (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (self.position_secs / self.duration_secs).clamp(0.0, 1.0) as f32
    }
}

const UNMUTED_VOLUME: f32 = 0.8;

/// Transport controller for one media element
pub struct Player {
    element: Box<dyn MediaElement>,
    notices: Notices,
    asset: Option<AssetHandle>,
    is_playing: bool,
    position_secs: f64,
    duration_secs: f64,
    volume: f32,
    volume_before_mute: f32,
    seek_step_secs: f64,
    pending_play: Option<PlayRequest>,
}

impl Player {
    pub fn new(element: Box<dyn MediaElement>, notices: Notices, volume: f32, seek_step_secs: f64) -> Self {
        let volume = if volume.is_nan() { UNMUTED_VOLUME } else { volume.clamp(0.0, 1.0) };
        Self {
            element,
            notices,
            asset: None,
            is_playing: false,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume,
            volume_before_mute: UNMUTED_VOLUME,
            seek_step_secs,
            pending_play: None,
        }
    }

    pub fn transport(&self) -> Transport {
        match (&self.asset, self.is_playing) {
            (None, _) => Transport::Empty,
            (Some(_), false) => Transport::Paused,
            (Some(_), true) => Transport::Playing,
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            asset_ref: self.asset.as_ref().map(|a| a.reference().to_string()),
            is_playing: self.is_playing,
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            volume: self.volume,
        }
    }

    pub fn asset(&self) -> Option<&AssetHandle> {
        self.asset.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Load an asset, tearing down whatever was loaded before
    pub fn load(&mut self, asset: AssetHandle) {
        self.unload();

        info!(reference = %asset.reference(), "Loading asset");
        self.element.set_volume(self.volume);
        if let Err(e) = self.element.load(&asset) {
            warn!(reference = %asset.reference(), error = %e, "Failed to load asset");
            self.element.unload();
            self.report(e);
            return;
        }

        self.duration_secs = asset.clip().map(|clip| clip.duration_seconds()).unwrap_or(0.0);
        self.position_secs = 0.0;
        self.asset = Some(asset);
    }

    /// Stop playback and release the loaded asset
    pub fn unload(&mut self) {
        let Some(previous) = self.asset.take() else {
            return;
        };

        if self.is_playing {
            self.element.pause();
        }
        self.element.unload();
        debug!(reference = %previous.reference(), "Asset unloaded");
        drop(previous);

        self.is_playing = false;
        self.pending_play = None;
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        // Events still queued for the old asset are stale
        for stale in self.element.events().try_iter() {
            debug!(?stale.event, "Discarding stale media event");
        }
    }

    /// Start playback. Returns false when nothing is loaded.
    pub fn play(&mut self) -> bool {
        if self.asset.is_none() {
            return false;
        }
        if self.is_playing {
            return true;
        }

        // Replay from the start once the end was reached
        if self.duration_secs > 0.0 && self.position_secs >= self.duration_secs {
            self.seek(0.0);
        }

        self.is_playing = true;
        self.pending_play = Some(self.element.play());
        self.poll_pending_play();
        self.is_playing
    }

    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.element.pause();
        self.is_playing = false;
        self.pending_play = None;
    }

    pub fn toggle(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move to `target_secs`, clamped to the asset. Returns the new position.
    pub fn seek(&mut self, target_secs: f64) -> f64 {
        if self.asset.is_none() || target_secs.is_nan() {
            return self.position_secs;
        }

        let position = target_secs.clamp(0.0, self.duration_secs.max(0.0));
        self.element.set_current_time(position);
        self.position_secs = position;
        position
    }

    /// Seek to a fraction of the duration (progress bar clicks)
    pub fn seek_fraction(&mut self, fraction: f64) -> f64 {
        self.seek(fraction * self.duration_secs)
    }

    pub fn step(&mut self, delta_secs: f64) -> f64 {
        self.seek(self.position_secs + delta_secs)
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.element.set_volume(self.volume);
    }

    pub fn toggle_mute(&mut self) {
        if self.volume > 0.0 {
            self.volume_before_mute = self.volume;
            self.set_volume(0.0);
        } else {
            let restore = if self.volume_before_mute > 0.0 {
                self.volume_before_mute
            } else {
                UNMUTED_VOLUME
            };
            self.set_volume(restore);
        }
    }

    /// Apply a keyboard shortcut. Shortcuts are ignored while a text field
    /// has focus. Returns true when the key was handled.
    pub fn handle_key(&mut self, key: TransportKey, text_input_focused: bool) -> bool {
        if text_input_focused || self.asset.is_none() {
            return false;
        }

        match key {
            TransportKey::Space => self.toggle(),
            TransportKey::ArrowLeft => {
                self.step(-self.seek_step_secs);
            }
            TransportKey::ArrowRight => {
                self.step(self.seek_step_secs);
            }
        }
        true
    }

    /// Apply element callbacks and play results. Call from the event loop.
    pub fn poll(&mut self) {
        self.element.tick();
        self.poll_pending_play();

        let current = self.asset.as_ref().map(|asset| asset.id());
        let events: Vec<_> = self.element.events().try_iter().collect();
        for event in events {
            if current == Some(event.asset_id) {
                self.apply(event.event);
            } else {
                debug!(?event.event, "Ignoring event for an unloaded asset");
            }
        }
    }

    fn poll_pending_play(&mut self) {
        let Some(pending) = &self.pending_play else {
            return;
        };

        match poll_completion(pending) {
            CompletionState::Pending => {}
            CompletionState::Ready(Ok(())) => {
                self.pending_play = None;
                debug!("Playback started");
            }
            CompletionState::Ready(Err(e)) => {
                self.pending_play = None;
                self.is_playing = false;
                warn!(error = %e, "Playback could not start");
                self.report(e);
            }
            CompletionState::Abandoned => {
                self.pending_play = None;
                self.is_playing = false;
                self.report(ProseError::PlaybackFailure("play request was dropped".into()));
            }
        }
    }

    fn apply(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedMetadata { duration_secs } => {
                self.duration_secs = if duration_secs.is_finite() && duration_secs > 0.0 {
                    duration_secs
                } else {
                    0.0
                };
                self.position_secs = self.position_secs.clamp(0.0, self.duration_secs);
            }
            MediaEvent::TimeUpdate { position_secs } => {
                if position_secs.is_nan() {
                    return;
                }
                self.position_secs = position_secs.clamp(0.0, self.duration_secs);
                if self.is_playing && self.duration_secs > 0.0 && self.position_secs >= self.duration_secs {
                    self.finish();
                }
            }
            MediaEvent::Ended => self.finish(),
            MediaEvent::Error(message) => {
                warn!(%message, "Playback error");
                self.is_playing = false;
                self.pending_play = None;
                self.report(ProseError::PlaybackFailure(message));
            }
        }
    }

    fn finish(&mut self) {
        if self.is_playing {
            debug!("Reached end of asset");
        }
        self.is_playing = false;
        self.pending_play = None;
        self.position_secs = self.duration_secs;
    }

    fn report(&self, error: ProseError) {
        let error = match error {
            e @ ProseError::PlaybackFailure(_) => e,
            other => ProseError::PlaybackFailure(other.to_string()),
        };
        self.notices.report(&error);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unload();
    }
}
