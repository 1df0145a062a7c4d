pub mod assets;
pub mod capture;
pub mod config;
pub mod context;
pub mod drafts;
pub mod notices;
pub mod playback;
pub mod share;
pub mod storage;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProseError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Playback failure: {0}")]
    PlaybackFailure(String),

    #[error("Share cancelled")]
    ShareCancelled,

    #[error("Share failed: {0}")]
    ShareFailure(String),

    #[error("Audio encoding error: {0}")]
    AudioEncoding(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for ProseError {
    fn from(e: std::io::Error) -> Self {
        ProseError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for ProseError {
    fn from(e: serde_json::Error) -> Self {
        ProseError::Serialization(e.to_string())
    }
}

impl ProseError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user can grant access and try again
            ProseError::PermissionDenied(_) => true,
            // Hardware errors need the user to plug something in
            ProseError::DeviceUnavailable(_) => false,
            // Autosave keeps retrying on the next trigger
            ProseError::StorageFailure(_) => true,
            ProseError::Serialization(_) => true,
            ProseError::PlaybackFailure(_) => true,
            ProseError::ShareCancelled => true,
            ProseError::ShareFailure(_) => true,
            ProseError::AudioEncoding(_) => true,
            ProseError::ConfigError(_) => false,
            ProseError::IOError(_) => false,
        }
    }

    /// Errors that are logged but never shown to the user
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            ProseError::StorageFailure(_) | ProseError::Serialization(_) | ProseError::ShareCancelled
        )
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ProseError::PermissionDenied(_) => {
                "Microphone access was denied. Allow access in your system settings and try again."
                    .to_string()
            }
            ProseError::DeviceUnavailable(_) => {
                "No microphone found. Please connect a recording device.".to_string()
            }
            ProseError::StorageFailure(_) => {
                "Drafts could not be saved locally.".to_string()
            }
            ProseError::Serialization(_) => {
                "Saved data could not be read.".to_string()
            }
            ProseError::PlaybackFailure(_) => {
                "Audio playback failed. Please try again.".to_string()
            }
            ProseError::ShareCancelled => String::new(),
            ProseError::ShareFailure(_) => {
                "Could not share or copy the audio link.".to_string()
            }
            ProseError::AudioEncoding(_) => {
                "The recording could not be encoded.".to_string()
            }
            ProseError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            ProseError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProseError>;
