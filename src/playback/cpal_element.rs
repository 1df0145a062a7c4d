use super::element::{ElementEvent, MediaElement, MediaEvent, PlayRequest};
use crate::assets::{AssetHandle, AudioClip};
use crate::utils::resolved;
use crate::{ProseError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Read position shared with the audio callback
#[derive(Debug)]
struct PlayHead {
    clip: Arc<AudioClip>,
    /// Position in clip frames; fractional for rate conversion
    frame: f64,
    playing: bool,
    volume: f32,
    ended: bool,
}

impl PlayHead {
    fn total_frames(&self) -> f64 {
        if self.clip.channels == 0 {
            return 0.0;
        }
        (self.clip.samples.len() / self.clip.channels as usize) as f64
    }

    fn position_secs(&self) -> f64 {
        if self.clip.sample_rate == 0 {
            return 0.0;
        }
        self.frame / self.clip.sample_rate as f64
    }
}

struct Output {
    asset_id: Uuid,
    head: Arc<Mutex<PlayHead>>,
    _stream: Stream,
}

/// Plays in-memory clips on the default output device
pub struct CpalElement {
    device: Device,
    config: StreamConfig,
    output: Option<Output>,
    volume: f32,
    events_tx: Sender<ElementEvent>,
    events_rx: Receiver<ElementEvent>,
}

impl CpalElement {
    /// Create an element on the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| ProseError::PlaybackFailure("No output device available".into()))?;

        info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let config = device
            .default_output_config()
            .map_err(|e| ProseError::PlaybackFailure(format!("Failed to get output config: {}", e)))?
            .into();

        let (events_tx, events_rx) = unbounded();
        Ok(Self {
            device,
            config,
            output: None,
            volume: 1.0,
            events_tx,
            events_rx,
        })
    }

    fn build_stream(&self, head: Arc<Mutex<PlayHead>>) -> Result<Stream> {
        let out_channels = self.config.channels as usize;
        let out_rate = self.config.sample_rate.0 as f64;

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut head = head.lock();
                    if !head.playing {
                        data.fill(0.0);
                        return;
                    }

                    let clip = Arc::clone(&head.clip);
                    let in_channels = clip.channels.max(1) as usize;
                    let step = clip.sample_rate as f64 / out_rate;
                    let total = head.total_frames();

                    for frame in data.chunks_mut(out_channels) {
                        if head.frame >= total {
                            frame.fill(0.0);
                            head.playing = false;
                            head.ended = true;
                            continue;
                        }

                        let base = head.frame as usize * in_channels;
                        for (c, out) in frame.iter_mut().enumerate() {
                            let sample = clip.samples.get(base + c % in_channels).copied().unwrap_or(0.0);
                            *out = sample * head.volume;
                        }
                        head.frame += step;
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| ProseError::PlaybackFailure(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ProseError::PlaybackFailure(format!("Failed to start output stream: {}", e)))?;

        Ok(stream)
    }

    fn emit(&self, asset_id: Uuid, event: MediaEvent) {
        let _ = self.events_tx.send(ElementEvent::new(asset_id, event));
    }
}

impl MediaElement for CpalElement {
    fn load(&mut self, asset: &AssetHandle) -> Result<()> {
        let clip = asset.clip().ok_or_else(|| {
            ProseError::PlaybackFailure("remote audio needs a streaming backend".to_string())
        })?;

        let head = Arc::new(Mutex::new(PlayHead {
            clip: Arc::clone(clip),
            frame: 0.0,
            playing: false,
            volume: self.volume,
            ended: false,
        }));
        let stream = self.build_stream(Arc::clone(&head))?;

        self.output = Some(Output {
            asset_id: asset.id(),
            head,
            _stream: stream,
        });
        self.emit(
            asset.id(),
            MediaEvent::LoadedMetadata {
                duration_secs: clip.duration_seconds(),
            },
        );
        Ok(())
    }

    fn unload(&mut self) {
        if self.output.take().is_some() {
            info!("Stopped audio playback");
        }
    }

    fn play(&mut self) -> PlayRequest {
        let Some(output) = &self.output else {
            return resolved(Err(ProseError::PlaybackFailure("nothing loaded".to_string())));
        };

        let mut head = output.head.lock();
        if head.frame >= head.total_frames() {
            head.frame = 0.0;
        }
        head.ended = false;
        head.playing = true;
        resolved(Ok(()))
    }

    fn pause(&mut self) {
        if let Some(output) = &self.output {
            output.head.lock().playing = false;
        }
    }

    fn set_current_time(&mut self, position_secs: f64) {
        if let Some(output) = &self.output {
            let mut head = output.head.lock();
            let frame = position_secs * head.clip.sample_rate as f64;
            head.frame = frame.clamp(0.0, head.total_frames());
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(output) = &self.output {
            output.head.lock().volume = volume;
        }
    }

    fn events(&self) -> &Receiver<ElementEvent> {
        &self.events_rx
    }

    fn tick(&mut self) {
        let Some(output) = &self.output else {
            return;
        };

        let (position_secs, playing, ended) = {
            let mut head = output.head.lock();
            let ended = std::mem::take(&mut head.ended);
            (head.position_secs(), head.playing, ended)
        };

        let asset_id = output.asset_id;
        if playing || ended {
            self.emit(asset_id, MediaEvent::TimeUpdate { position_secs });
        }
        if ended {
            self.emit(asset_id, MediaEvent::Ended);
        }
    }
}
