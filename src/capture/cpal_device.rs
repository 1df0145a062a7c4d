use super::device::{CaptureDevice, CaptureStream, PermissionRequest};
use crate::utils::resolved;
use crate::{ProseError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use tracing::{debug, error, info};

/// Chunks buffered between the audio callback and the recorder
const CHUNK_BACKLOG: usize = 256;

/// The host's default input device
#[derive(Debug, Default)]
pub struct CpalDevice;

impl CpalDevice {
    pub fn new() -> Self {
        Self
    }

    fn open(&self) -> Result<CpalStream> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ProseError::DeviceUnavailable("No input device available".into()))?;

        info!("Using input device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| ProseError::DeviceUnavailable(format!("Failed to get input config: {}", e)))?
            .into();

        let channels = config.channels as usize;
        let (tx, rx) = bounded(CHUNK_BACKLOG);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Convert to mono if necessary
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = tx.try_send(samples) {
                        debug!("Dropped audio chunk: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| match e {
                BuildStreamError::DeviceNotAvailable => {
                    ProseError::DeviceUnavailable("Input device disappeared".into())
                }
                other => ProseError::PermissionDenied(format!("Failed to open input stream: {}", other)),
            })?;

        stream
            .play()
            .map_err(|e| ProseError::PermissionDenied(format!("Failed to start input stream: {}", e)))?;

        Ok(CpalStream {
            stream: Some(stream),
            chunks: rx,
            sample_rate: config.sample_rate.0,
        })
    }
}

impl CaptureDevice for CpalDevice {
    fn request_access(&mut self) -> PermissionRequest {
        resolved(self.open().map(|stream| Box::new(stream) as Box<dyn CaptureStream>))
    }

    fn name(&self) -> String {
        cpal::default_host()
            .default_input_device()
            .and_then(|device| device.name().ok())
            .unwrap_or_else(|| "default input".to_string())
    }
}

/// Open input stream, down-mixed to mono
pub struct CpalStream {
    stream: Option<Stream>,
    chunks: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl CaptureStream for CpalStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        1
    }

    fn chunks(&self) -> &Receiver<Vec<f32>> {
        &self.chunks
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio recording");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop();
    }
}
