//! Audio assets and their transient references
//!
//! A recorded or generated clip is addressed by an [`AssetHandle`]. Handles are
//! reference counted: every holder (the session list, a player) keeps its own
//! clone and the registry entry disappears when the last one is dropped.

use crate::{ProseError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Weak};
use tracing::{debug, info};
use uuid::Uuid;

/// Decoded audio: interleaved f32 samples in -1.0..=1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode as 16-bit PCM WAV
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut bytes = Vec::new();
        {
            let mut cursor = Cursor::new(&mut bytes);
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| ProseError::AudioEncoding(format!("Failed to create WAV writer: {}", e)))?;

            for &sample in &self.samples {
                let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(sample_i16)
                    .map_err(|e| ProseError::AudioEncoding(format!("Failed to write sample: {}", e)))?;
            }

            writer
                .finalize()
                .map_err(|e| ProseError::AudioEncoding(format!("Failed to finalize WAV: {}", e)))?;
        }

        Ok(bytes)
    }

    /// Decode WAV bytes (16/24/32-bit integer or float)
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| ProseError::AudioEncoding(format!("Failed to read WAV header: {}", e)))?;
        let spec = reader.spec();

        let read_err = |e: hound::Error| ProseError::AudioEncoding(format!("Failed to read sample: {}", e));
        let samples: Result<Vec<f32>> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, _) => reader.samples::<f32>().map(|s| s.map_err(read_err)).collect(),
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / i16::MAX as f32).map_err(read_err))
                .collect(),
            (SampleFormat::Int, 24) => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0).map_err(read_err))
                .collect(),
            (SampleFormat::Int, 32) => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / i32::MAX as f32).map_err(read_err))
                .collect(),
            (_, bits) => {
                return Err(ProseError::AudioEncoding(format!("Unsupported bit depth: {}", bits)))
            }
        };

        Ok(Self::new(samples?, spec.sample_rate, spec.channels))
    }

    /// Durable text form: base64 of the WAV encoding
    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_wav_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| ProseError::AudioEncoding(format!("Invalid base64 audio: {}", e)))?;
        Self::from_wav_bytes(&bytes)
    }
}

/// Where an asset's audio comes from
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Audio held in memory, e.g. a recording
    Clip(Arc<AudioClip>),
    /// Audio delivered by a server
    Remote(String),
}

type LiveSet = Mutex<HashMap<Uuid, String>>;

#[derive(Debug)]
struct AssetInner {
    id: Uuid,
    reference: String,
    source: AssetSource,
    registry: Weak<LiveSet>,
}

impl Drop for AssetInner {
    fn drop(&mut self) {
        if let Some(live) = self.registry.upgrade() {
            live.lock().remove(&self.id);
        }
        debug!(reference = %self.reference, "Asset released");
    }
}

/// Shared reference to a registered asset
#[derive(Debug, Clone)]
pub struct AssetHandle {
    inner: Arc<AssetInner>,
}

impl AssetHandle {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Reference string handed to players and share targets
    pub fn reference(&self) -> &str {
        &self.inner.reference
    }

    pub fn source(&self) -> &AssetSource {
        &self.inner.source
    }

    pub fn clip(&self) -> Option<&Arc<AudioClip>> {
        match &self.inner.source {
            AssetSource::Clip(clip) => Some(clip),
            AssetSource::Remote(_) => None,
        }
    }

    /// Number of live handles to this asset
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl PartialEq for AssetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for AssetHandle {}

/// Tracks which assets are still referenced
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    live: Arc<LiveSet>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, reference: String, id: Uuid, source: AssetSource) -> AssetHandle {
        self.live.lock().insert(id, reference.clone());
        AssetHandle {
            inner: Arc::new(AssetInner {
                id,
                reference,
                source,
                registry: Arc::downgrade(&self.live),
            }),
        }
    }

    /// Register an in-memory clip
    pub fn create(&self, clip: AudioClip) -> AssetHandle {
        let id = Uuid::new_v4();
        let reference = format!("blob:prose-pause/{}", id);
        debug!(%reference, seconds = clip.duration_seconds(), "Asset created");
        self.register(reference, id, AssetSource::Clip(Arc::new(clip)))
    }

    /// Register audio that lives at `url`
    pub fn register_remote(&self, url: impl Into<String>) -> AssetHandle {
        let url = url.into();
        info!(%url, "Remote asset registered");
        self.register(url.clone(), Uuid::new_v4(), AssetSource::Remote(url))
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.live.lock().contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}
