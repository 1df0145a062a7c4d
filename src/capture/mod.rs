//! Microphone capture
//!
//! [`Recorder`] drives a device through `Idle → Requesting → Recording →
//! Finalizing → Idle`, collects sample chunks and files each finished
//! recording into a [`SessionLibrary`].

#[cfg(feature = "audio-io")]
pub mod cpal_device;
pub mod device;
pub mod library;
pub mod recorder;
pub mod session;

#[cfg(feature = "audio-io")]
pub use cpal_device::CpalDevice;
pub use device::{CaptureDevice, CaptureStream, PermissionRequest, UnavailableDevice};
pub use library::{SessionLibrary, RECORDINGS_KEY};
pub use recorder::{CaptureState, Recorder, StartOutcome};
pub use session::CaptureSession;
