use super::element::{ElementEvent, MediaElement, MediaEvent, PlayRequest};
use crate::assets::AssetHandle;
use crate::utils::{resolved, SharedClock};
use crate::{ProseError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug)]
struct Loaded {
    asset_id: Uuid,
    duration_secs: f64,
    position_secs: f64,
    /// Monotonic time playback last started from `position_secs`
    playing_since: Option<Duration>,
}

/// Silent element that advances along the clock
///
/// Used when no audio output is available, and as a deterministic element for
/// driving the player from a [`crate::utils::ManualClock`].
pub struct TimelineElement {
    clock: SharedClock,
    events_tx: Sender<ElementEvent>,
    events_rx: Receiver<ElementEvent>,
    loaded: Option<Loaded>,
    volume: f32,
}

impl TimelineElement {
    pub fn new(clock: SharedClock) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            clock,
            events_tx,
            events_rx,
            loaded: None,
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn emit(&self, asset_id: Uuid, event: MediaEvent) {
        // The receiver lives in `self`, so sending cannot fail
        let _ = self.events_tx.send(ElementEvent::new(asset_id, event));
    }

    fn current_position(&self, loaded: &Loaded) -> f64 {
        match loaded.playing_since {
            Some(since) => {
                let played = self.clock.monotonic().saturating_sub(since).as_secs_f64();
                (loaded.position_secs + played).min(loaded.duration_secs)
            }
            None => loaded.position_secs,
        }
    }
}

impl MediaElement for TimelineElement {
    fn load(&mut self, asset: &AssetHandle) -> Result<()> {
        let clip = asset.clip().ok_or_else(|| {
            ProseError::PlaybackFailure("remote audio needs a streaming backend".to_string())
        })?;

        let duration_secs = clip.duration_seconds();
        self.loaded = Some(Loaded {
            asset_id: asset.id(),
            duration_secs,
            position_secs: 0.0,
            playing_since: None,
        });
        self.emit(asset.id(), MediaEvent::LoadedMetadata { duration_secs });
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
    }

    fn play(&mut self) -> PlayRequest {
        let now = self.clock.monotonic();
        let Some(loaded) = self.loaded.as_mut() else {
            return resolved(Err(ProseError::PlaybackFailure("nothing loaded".to_string())));
        };

        if loaded.position_secs >= loaded.duration_secs {
            loaded.position_secs = 0.0;
        }
        loaded.playing_since = Some(now);
        resolved(Ok(()))
    }

    fn pause(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            let position_secs = self.current_position(&loaded);
            self.loaded = Some(Loaded {
                position_secs,
                playing_since: None,
                ..loaded
            });
        }
    }

    fn set_current_time(&mut self, position_secs: f64) {
        let now = self.clock.monotonic();
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.position_secs = position_secs.clamp(0.0, loaded.duration_secs);
            if loaded.playing_since.is_some() {
                loaded.playing_since = Some(now);
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn events(&self) -> &Receiver<ElementEvent> {
        &self.events_rx
    }

    fn tick(&mut self) {
        let Some(loaded) = self.loaded.take() else {
            return;
        };
        if loaded.playing_since.is_none() {
            self.loaded = Some(loaded);
            return;
        }

        let position_secs = self.current_position(&loaded);
        let asset_id = loaded.asset_id;
        if position_secs >= loaded.duration_secs {
            self.loaded = Some(Loaded {
                position_secs: loaded.duration_secs,
                playing_since: None,
                ..loaded
            });
            self.emit(asset_id, MediaEvent::TimeUpdate { position_secs });
            self.emit(asset_id, MediaEvent::Ended);
        } else {
            self.loaded = Some(loaded);
            self.emit(asset_id, MediaEvent::TimeUpdate { position_secs });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetRegistry, AudioClip};
    use crate::utils::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    fn two_second_clip(assets: &AssetRegistry) -> AssetHandle {
        assets.create(AudioClip::new(vec![0.0; 32000], 16000, 1))
    }

    #[test]
    fn test_advances_with_clock_and_ends() {
        let clock = ManualClock::default();
        let assets = AssetRegistry::new();
        let asset = two_second_clip(&assets);
        let mut element = TimelineElement::new(Arc::new(clock.clone()));

        element.load(&asset).unwrap();
        element.play();
        clock.advance(Duration::from_millis(500));
        element.tick();
        clock.advance(Duration::from_secs(2));
        element.tick();

        let events: Vec<_> = element.events().try_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                MediaEvent::LoadedMetadata { duration_secs: 2.0 },
                MediaEvent::TimeUpdate { position_secs: 0.5 },
                MediaEvent::TimeUpdate { position_secs: 2.0 },
                MediaEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_pause_freezes_position() {
        let clock = ManualClock::default();
        let assets = AssetRegistry::new();
        let asset = two_second_clip(&assets);
        let mut element = TimelineElement::new(Arc::new(clock.clone()));

        element.load(&asset).unwrap();
        element.play();
        clock.advance(Duration::from_secs(1));
        element.pause();
        clock.advance(Duration::from_secs(5));
        element.tick();

        // Paused elements stay quiet
        let events: Vec<_> = element.events().try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(element.loaded.as_ref().unwrap().position_secs, 1.0);
    }

    #[test]
    fn test_remote_asset_rejected() {
        let assets = AssetRegistry::new();
        let asset = assets.register_remote("https://example.com/a.mp3");
        let mut element = TimelineElement::new(Arc::new(ManualClock::default()));
        assert!(matches!(element.load(&asset), Err(ProseError::PlaybackFailure(_))));
    }
}
