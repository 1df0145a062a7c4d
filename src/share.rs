//! Sharing and exporting recordings
//!
//! Sharing tries the platform share sheet first and falls back to copying the
//! asset reference to the clipboard. A cancelled share is not a failure and
//! does not fall back. Nothing here returns an error to the UI: failures are
//! logged and reported as low-priority notices.

use crate::assets::AssetHandle;
use crate::notices::Notices;
use crate::{ProseError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What gets shared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn for_asset(asset: &AssetHandle, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            text: format!("Listen to \"{}\"", title),
            title,
            url: asset.reference().to_string(),
        }
    }
}

/// Native share sheet
pub trait ShareSheet {
    fn is_available(&self) -> bool;

    /// Share the payload. A dismissed sheet returns [`ProseError::ShareCancelled`].
    fn share(&mut self, payload: &SharePayload) -> Result<()>;
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Share sheet for platforms that have none
#[derive(Debug, Default)]
pub struct NoShareSheet;

impl ShareSheet for NoShareSheet {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&mut self, _payload: &SharePayload) -> Result<()> {
        Err(ProseError::ShareFailure("no share sheet on this platform".to_string()))
    }
}

/// Clipboard that keeps the last copied text, for hosts without a system one
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// How a share request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The reference was copied to the clipboard instead
    Copied,
    Cancelled,
    Failed,
}

/// Share via the sheet when possible, else copy the URL
pub fn share_or_copy(
    sheet: &mut dyn ShareSheet,
    clipboard: &mut dyn Clipboard,
    payload: &SharePayload,
    notices: &Notices,
) -> ShareOutcome {
    if sheet.is_available() {
        match sheet.share(payload) {
            Ok(()) => {
                info!(url = %payload.url, "Shared");
                return ShareOutcome::Shared;
            }
            Err(ProseError::ShareCancelled) => {
                debug!("Share cancelled by user");
                return ShareOutcome::Cancelled;
            }
            Err(e) => warn!(error = %e, "Share sheet failed, copying instead"),
        }
    }

    match clipboard.write_text(&payload.url) {
        Ok(()) => {
            info!(url = %payload.url, "Copied to clipboard");
            ShareOutcome::Copied
        }
        Err(e) => {
            warn!(error = %e, "Clipboard fallback failed");
            let error = match e {
                e @ ProseError::ShareFailure(_) => e,
                other => ProseError::ShareFailure(other.to_string()),
            };
            notices.report(&error);
            ShareOutcome::Failed
        }
    }
}

/// Write an in-memory asset to `path` as WAV
pub fn export_wav<P: AsRef<Path>>(asset: &AssetHandle, path: P) -> Result<()> {
    let path = path.as_ref();
    let clip = asset.clip().ok_or_else(|| {
        ProseError::ShareFailure("remote audio cannot be exported".to_string())
    })?;

    let bytes = clip.to_wav_bytes()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "Exported recording");
    Ok(())
}
