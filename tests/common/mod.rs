//! Scripted platform fakes shared by the integration tests

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use prose_pause::assets::AssetHandle;
use prose_pause::capture::{CaptureDevice, CaptureStream, PermissionRequest};
use prose_pause::config::AppConfig;
use prose_pause::context::AppContext;
use prose_pause::playback::{ElementEvent, MediaElement, MediaEvent, PlayRequest};
use prose_pause::share::{Clipboard, SharePayload, ShareSheet};
use prose_pause::storage::MemoryStore;
use prose_pause::utils::{completion, resolved, ManualClock};
use prose_pause::{ProseError, Result};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// A context over an in-memory store and a manual clock
pub fn test_context(config: AppConfig) -> (AppContext, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let context = AppContext::with_parts(config.in_memory(), Arc::new(store.clone()), Arc::new(clock.clone()));
    (context, store, clock)
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// How the fake device answers an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Grant,
    Deny,
    /// Keep the request pending until [`MicProbe::grant`] or [`MicProbe::deny`]
    Defer,
}

#[derive(Default)]
struct MicInner {
    requests: usize,
    stops: usize,
    live_streams: usize,
    chunks: Option<Sender<Vec<f32>>>,
    deferred: Option<Sender<Result<Box<dyn CaptureStream>>>>,
}

/// Test-side view of a [`FakeDevice`]
#[derive(Clone, Default)]
pub struct MicProbe {
    inner: Rc<RefCell<MicInner>>,
}

impl MicProbe {
    fn open_stream(&self) -> FakeStream {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.borrow_mut();
        inner.chunks = Some(tx);
        inner.live_streams += 1;
        FakeStream {
            chunks: rx,
            probe: self.clone(),
            stopped: false,
        }
    }

    /// Deliver a chunk of samples from the microphone
    pub fn push(&self, samples: Vec<f32>) {
        if let Some(tx) = &self.inner.borrow().chunks {
            let _ = tx.send(samples);
        }
    }

    /// Answer a deferred request with access
    pub fn grant(&self) {
        let stream = self.open_stream();
        let deferred = self.inner.borrow_mut().deferred.take();
        if let Some(tx) = deferred {
            let _ = tx.send(Ok(Box::new(stream)));
        }
    }

    /// Answer a deferred request with a refusal
    pub fn deny(&self) {
        let deferred = self.inner.borrow_mut().deferred.take();
        if let Some(tx) = deferred {
            let _ = tx.send(Err(ProseError::PermissionDenied("user refused".to_string())));
        }
    }

    pub fn requests(&self) -> usize {
        self.inner.borrow().requests
    }

    pub fn stops(&self) -> usize {
        self.inner.borrow().stops
    }

    /// Streams handed out and not yet dropped
    pub fn live_streams(&self) -> usize {
        self.inner.borrow().live_streams
    }
}

pub struct FakeStream {
    chunks: Receiver<Vec<f32>>,
    probe: MicProbe,
    stopped: bool,
}

impl CaptureStream for FakeStream {
    fn sample_rate(&self) -> u32 {
        16000
    }

    fn channels(&self) -> u16 {
        1
    }

    fn chunks(&self) -> &Receiver<Vec<f32>> {
        &self.chunks
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.probe.inner.borrow_mut().stops += 1;
        }
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.stop();
        self.probe.inner.borrow_mut().live_streams -= 1;
    }
}

pub struct FakeDevice {
    answer: Answer,
    probe: MicProbe,
}

impl FakeDevice {
    pub fn new(answer: Answer) -> (Self, MicProbe) {
        let probe = MicProbe::default();
        (
            Self {
                answer,
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl CaptureDevice for FakeDevice {
    fn request_access(&mut self) -> PermissionRequest {
        self.probe.inner.borrow_mut().requests += 1;
        match self.answer {
            Answer::Grant => {
                let stream: Box<dyn CaptureStream> = Box::new(self.probe.open_stream());
                resolved(Ok(stream))
            }
            Answer::Deny => resolved(Err(ProseError::PermissionDenied("user refused".to_string()))),
            Answer::Defer => {
                let (tx, rx) = completion();
                self.probe.inner.borrow_mut().deferred = Some(tx);
                rx
            }
        }
    }

    fn name(&self) -> String {
        "fake microphone".to_string()
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// How the fake element answers play requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAnswer {
    Accept,
    /// The platform refuses to start, as an autoplay policy would
    Reject,
    Defer,
}

struct ElementInner {
    calls: Vec<String>,
    play_answer: PlayAnswer,
    deferred: Option<Sender<Result<()>>>,
    fail_load: bool,
}

/// Test-side view of a [`FakeElement`]
#[derive(Clone)]
pub struct ElementProbe {
    inner: Rc<RefCell<ElementInner>>,
    events: Sender<ElementEvent>,
}

impl ElementProbe {
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.inner.borrow().calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn last_call(&self) -> Option<String> {
        self.inner.borrow().calls.last().cloned()
    }

    pub fn set_play_answer(&self, answer: PlayAnswer) {
        self.inner.borrow_mut().play_answer = answer;
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.inner.borrow_mut().fail_load = fail;
    }

    /// Resolve a deferred play request
    pub fn resolve_play(&self, result: Result<()>) {
        let deferred = self.inner.borrow_mut().deferred.take();
        if let Some(tx) = deferred {
            let _ = tx.send(result);
        }
    }

    /// Fire a media callback as the platform would
    pub fn emit(&self, asset: &AssetHandle, event: MediaEvent) {
        self.emit_for(asset.id(), event);
    }

    pub fn emit_for(&self, asset_id: Uuid, event: MediaEvent) {
        let _ = self.events.send(ElementEvent::new(asset_id, event));
    }
}

pub struct FakeElement {
    probe: ElementProbe,
    events: Receiver<ElementEvent>,
}

impl FakeElement {
    pub fn new() -> (Self, ElementProbe) {
        let (tx, rx) = unbounded();
        let probe = ElementProbe {
            inner: Rc::new(RefCell::new(ElementInner {
                calls: Vec::new(),
                play_answer: PlayAnswer::Accept,
                deferred: None,
                fail_load: false,
            })),
            events: tx,
        };
        (
            Self {
                probe: probe.clone(),
                events: rx,
            },
            probe,
        )
    }

    fn record(&self, call: String) {
        self.probe.inner.borrow_mut().calls.push(call);
    }
}

impl MediaElement for FakeElement {
    fn load(&mut self, asset: &AssetHandle) -> Result<()> {
        self.record(format!("load {}", asset.reference()));
        if self.probe.inner.borrow().fail_load {
            return Err(ProseError::PlaybackFailure("unsupported format".to_string()));
        }
        Ok(())
    }

    fn unload(&mut self) {
        self.record("unload".to_string());
    }

    fn play(&mut self) -> PlayRequest {
        self.record("play".to_string());
        let answer = self.probe.inner.borrow().play_answer;
        match answer {
            PlayAnswer::Accept => resolved(Ok(())),
            PlayAnswer::Reject => resolved(Err(ProseError::PlaybackFailure(
                "play() was not allowed".to_string(),
            ))),
            PlayAnswer::Defer => {
                let (tx, rx) = completion();
                self.probe.inner.borrow_mut().deferred = Some(tx);
                rx
            }
        }
    }

    fn pause(&mut self) {
        self.record("pause".to_string());
    }

    fn set_current_time(&mut self, position_secs: f64) {
        self.record(format!("seek {:.1}", position_secs));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(format!("volume {:.2}", volume));
    }

    fn events(&self) -> &Receiver<ElementEvent> {
        &self.events
    }
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

pub struct FakeShareSheet {
    pub available: bool,
    pub answer: Result<()>,
    pub shared: Rc<RefCell<Vec<SharePayload>>>,
}

impl FakeShareSheet {
    pub fn answering(answer: Result<()>) -> Self {
        Self {
            available: true,
            answer,
            shared: Rc::default(),
        }
    }
}

impl ShareSheet for FakeShareSheet {
    fn is_available(&self) -> bool {
        self.available
    }

    fn share(&mut self, payload: &SharePayload) -> Result<()> {
        self.shared.borrow_mut().push(payload.clone());
        self.answer.clone()
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    pub fail: bool,
    pub writes: Rc<RefCell<Vec<String>>>,
}

impl FakeClipboard {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writes.borrow_mut().push(text.to_string());
        if self.fail {
            return Err(ProseError::ShareFailure("clipboard denied".to_string()));
        }
        Ok(())
    }
}
