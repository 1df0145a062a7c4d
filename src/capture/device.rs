use crate::utils::{resolved, Completion};
use crate::ProseError;
use crossbeam_channel::Receiver;

/// An open input stream
///
/// Dropping a stream must release the device just like [`CaptureStream::stop`].
pub trait CaptureStream {
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Interleaved sample chunks in capture order
    fn chunks(&self) -> &Receiver<Vec<f32>>;

    /// Stop the device tracks. Calling it twice is harmless.
    fn stop(&mut self);
}

/// Pending answer to an access request
pub type PermissionRequest = Completion<Box<dyn CaptureStream>>;

/// A microphone (or other input) that needs permission before it streams
pub trait CaptureDevice {
    /// Ask for access. The answer may arrive later; it resolves to an open
    /// stream, or to `PermissionDenied` / `DeviceUnavailable`.
    fn request_access(&mut self) -> PermissionRequest;

    fn name(&self) -> String {
        "input".to_string()
    }
}

/// Device used when no capture backend is compiled in
#[derive(Debug, Default)]
pub struct UnavailableDevice;

impl CaptureDevice for UnavailableDevice {
    fn request_access(&mut self) -> PermissionRequest {
        resolved(Err(ProseError::DeviceUnavailable(
            "no capture backend available".to_string(),
        )))
    }

    fn name(&self) -> String {
        "unavailable".to_string()
    }
}
