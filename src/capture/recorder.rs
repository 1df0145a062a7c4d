use super::device::{CaptureDevice, CaptureStream, PermissionRequest};
use super::library::SessionLibrary;
use super::session::CaptureSession;
use crate::assets::{AssetRegistry, AudioClip};
use crate::notices::Notices;
use crate::utils::{poll_completion, CompletionState, SharedClock};
use crate::ProseError;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capture state machine
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    /// Not recording
    Idle,
    /// Waiting for the user or platform to grant device access
    Requesting,
    /// Collecting audio
    Recording {
        session_id: Uuid,
        started_at: DateTime<Utc>,
    },
    /// Assembling the recorded chunks into an asset
    Finalizing,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Access was requested; recording begins once granted
    Requested,
    /// A recording is already in progress; nothing changed
    AlreadyActive,
}

/// Records from one device into a session library
pub struct Recorder {
    device: Box<dyn CaptureDevice>,
    library: SessionLibrary,
    assets: AssetRegistry,
    notices: Notices,
    clock: SharedClock,
    state: CaptureState,
    pending: Option<PermissionRequest>,
    stream: Option<Box<dyn CaptureStream>>,
    buffer: Vec<f32>,
    source_label: String,
    level: f32,
}

impl Recorder {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        library: SessionLibrary,
        assets: AssetRegistry,
        notices: Notices,
        clock: SharedClock,
    ) -> Self {
        Self {
            device,
            library,
            assets,
            notices,
            clock,
            state: CaptureState::Idle,
            pending: None,
            stream: None,
            buffer: Vec::new(),
            source_label: String::new(),
            level: 0.0,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recording { .. })
    }

    /// Requesting, recording or finalizing
    pub fn is_active(&self) -> bool {
        self.state != CaptureState::Idle
    }

    pub fn library(&self) -> &SessionLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut SessionLibrary {
        &mut self.library
    }

    /// Samples collected so far in the current recording
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Peak level of the most recent chunk (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Seconds recorded so far
    pub fn elapsed_secs(&self) -> f64 {
        match &self.state {
            CaptureState::Recording { started_at, .. } => {
                crate::utils::clock::elapsed_between(*started_at, self.clock.now()).as_secs_f64()
            }
            _ => 0.0,
        }
    }

    /// Begin a recording labelled with the topic being answered
    pub fn start(&mut self, source_label: impl Into<String>) -> StartOutcome {
        if self.state != CaptureState::Idle {
            warn!(state = ?self.state, "Already recording");
            return StartOutcome::AlreadyActive;
        }

        self.source_label = source_label.into();
        info!(device = %self.device.name(), "Requesting capture access");
        self.pending = Some(self.device.request_access());
        self.state = CaptureState::Requesting;

        // Grants that are already known take effect immediately
        self.poll();
        StartOutcome::Requested
    }

    /// Apply permission answers and collect new chunks. Call from the event loop.
    pub fn poll(&mut self) {
        match self.state {
            CaptureState::Requesting => self.poll_permission(),
            CaptureState::Recording { .. } => self.drain_chunks(),
            CaptureState::Idle | CaptureState::Finalizing => {}
        }
    }

    fn poll_permission(&mut self) {
        let Some(pending) = &self.pending else {
            self.state = CaptureState::Idle;
            return;
        };

        match poll_completion(pending) {
            CompletionState::Pending => {}
            CompletionState::Ready(Ok(stream)) => {
                self.pending = None;
                self.begin(stream);
            }
            CompletionState::Ready(Err(e)) => self.fail(e),
            CompletionState::Abandoned => self.fail(ProseError::PermissionDenied(
                "access request was abandoned".to_string(),
            )),
        }
    }

    fn begin(&mut self, stream: Box<dyn CaptureStream>) {
        let session_id = Uuid::new_v4();
        info!(
            %session_id,
            sample_rate = stream.sample_rate(),
            channels = stream.channels(),
            "Started recording"
        );

        self.buffer.clear();
        self.level = 0.0;
        self.stream = Some(stream);
        self.state = CaptureState::Recording {
            session_id,
            started_at: self.clock.now(),
        };
    }

    fn fail(&mut self, error: ProseError) {
        warn!(error = %error, "Capture access failed");
        self.pending = None;
        self.state = CaptureState::Idle;

        // Access problems are always shown, with retry guidance
        let error = match error {
            e @ (ProseError::PermissionDenied(_) | ProseError::DeviceUnavailable(_)) => e,
            other => ProseError::PermissionDenied(other.to_string()),
        };
        self.notices.report(&error);
    }

    fn drain_chunks(&mut self) {
        let Some(stream) = &self.stream else {
            return;
        };

        for chunk in stream.chunks().try_iter() {
            self.level = chunk.iter().fold(0.0f32, |peak, s| peak.max(s.abs())).min(1.0);
            self.buffer.extend_from_slice(&chunk);
        }
    }

    /// Stop recording and file the session. Returns the new session, or `None`
    /// if nothing was recording.
    pub fn stop(&mut self) -> Option<CaptureSession> {
        let (session_id, started_at) = match self.state {
            CaptureState::Recording {
                session_id,
                started_at,
            } => (session_id, started_at),
            CaptureState::Requesting => {
                info!("Capture request withdrawn before access was granted");
                self.pending = None;
                self.state = CaptureState::Idle;
                return None;
            }
            _ => return None,
        };

        // Take what the device already delivered, then refuse anything newer
        self.drain_chunks();
        self.state = CaptureState::Finalizing;

        let Some(mut stream) = self.stream.take() else {
            self.state = CaptureState::Idle;
            return None;
        };
        stream.stop();
        let (sample_rate, channels) = (stream.sample_rate(), stream.channels());
        drop(stream);

        let clip = AudioClip::new(std::mem::take(&mut self.buffer), sample_rate, channels);
        let duration_secs = clip.duration_seconds();
        let session = CaptureSession {
            id: session_id,
            source_label: std::mem::take(&mut self.source_label),
            asset: self.assets.create(clip),
            created_at: started_at,
            duration_secs,
        };

        info!(%session_id, seconds = duration_secs, "Stopped recording");
        self.library.add(session.clone());
        self.level = 0.0;
        self.state = CaptureState::Idle;
        Some(session)
    }

    /// Delete a recorded session
    pub fn delete(&mut self, id: Uuid) -> bool {
        self.library.remove(id)
    }

    /// Release the device without keeping the current recording
    pub fn shutdown(&mut self) {
        if self.pending.take().is_some() {
            debug!("Dropped pending capture request");
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Capture stream released on shutdown");
        }
        self.buffer.clear();
        self.level = 0.0;
        self.state = CaptureState::Idle;
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.shutdown();
    }
}
