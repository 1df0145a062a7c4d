use crate::assets::{AssetHandle, AssetRegistry, AudioClip};
use crate::storage::DurableStore;
use crate::{ProseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One finished recording
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub id: Uuid,
    /// Topic or prompt the user was answering
    pub source_label: String,
    pub asset: AssetHandle,
    pub created_at: DateTime<Utc>,
    pub duration_secs: f64,
}

/// Where a persisted session's audio lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum StoredAudio {
    /// Base64 WAV under its own store key
    Entry { key: String },
    Remote { url: String },
}

/// Durable form of a session, without the audio bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub id: Uuid,
    pub source_label: String,
    pub created_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub audio: StoredAudio,
}

impl StoredSession {
    pub fn new(session: &CaptureSession, audio: StoredAudio) -> Self {
        Self {
            id: session.id,
            source_label: session.source_label.clone(),
            created_at: session.created_at,
            duration_secs: session.duration_secs,
            audio,
        }
    }

    /// Rebuild the session, registering a fresh transient reference
    pub fn decode(self, store: &dyn DurableStore, assets: &AssetRegistry) -> Result<CaptureSession> {
        let asset = match self.audio {
            StoredAudio::Entry { key } => {
                let encoded = store.get(&key)?.ok_or_else(|| {
                    ProseError::StorageFailure(format!("Audio entry {} is missing", key))
                })?;
                assets.create(AudioClip::from_base64(&encoded)?)
            }
            StoredAudio::Remote { url } => assets.register_remote(url),
        };

        Ok(CaptureSession {
            id: self.id,
            source_label: self.source_label,
            asset,
            created_at: self.created_at,
            duration_secs: self.duration_secs,
        })
    }
}
