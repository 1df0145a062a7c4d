//! Host services for the desktop window

use super::state::Platform;
use crate::context::AppContext;
use crate::playback::{MediaElement, TimelineElement};
use crate::share::{Clipboard, NoShareSheet};
use crate::Result;
use tracing::warn;

/// Copies through egui's platform clipboard integration
pub struct EguiClipboard {
    ctx: egui::Context,
}

impl EguiClipboard {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl Clipboard for EguiClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.ctx.copy_text(text.to_string());
        Ok(())
    }
}

#[cfg(feature = "audio-io")]
fn output_element(context: &AppContext) -> Box<dyn MediaElement> {
    match crate::playback::CpalElement::new() {
        Ok(element) => Box::new(element),
        Err(e) => {
            warn!(error = %e, "No audio output, playback will be silent");
            Box::new(TimelineElement::new(context.clock.clone()))
        }
    }
}

#[cfg(not(feature = "audio-io"))]
fn output_element(context: &AppContext) -> Box<dyn MediaElement> {
    warn!("Built without audio-io, playback will be silent");
    Box::new(TimelineElement::new(context.clock.clone()))
}

#[cfg(feature = "audio-io")]
fn input_device() -> Box<dyn crate::capture::CaptureDevice> {
    Box::new(crate::capture::CpalDevice::new())
}

#[cfg(not(feature = "audio-io"))]
fn input_device() -> Box<dyn crate::capture::CaptureDevice> {
    Box::new(crate::capture::UnavailableDevice)
}

impl Platform {
    /// The machine's default audio devices and the window's clipboard
    pub fn native(context: &AppContext, ctx: &egui::Context) -> Self {
        Self {
            device: input_device(),
            element: output_element(context),
            share_sheet: Box::new(NoShareSheet),
            clipboard: Box::new(EguiClipboard::new(ctx.clone())),
        }
    }
}
