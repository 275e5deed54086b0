// Live capture from the default input device (desktop, via cpal)
//
// The cpal input callback owns a FrameChunker, so the callback does nothing
// but de-interleave into pre-allocated storage and push whole frames into the
// capture channel. Stream errors are logged; the stream keeps running.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::capture::{CaptureSink, FrameChunker};
use crate::error::{log_capture_error, CaptureError};

/// Properties of the default input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: usize,
}

fn default_device() -> Result<(cpal::Device, cpal::SupportedStreamConfig), CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureError::NoInputDevice)?;
    let config = device
        .default_input_config()
        .map_err(|e| CaptureError::StreamOpenFailed {
            reason: format!("Failed to get default input config: {:?}", e),
        })?;
    Ok((device, config))
}

/// Query the default input device, so the pipeline can be configured with
/// its sample rate before capture starts
pub fn default_input_info() -> Result<InputDeviceInfo, CaptureError> {
    let (device, config) = default_device()?;
    Ok(InputDeviceInfo {
        name: device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate: config.sample_rate().0,
        channels: config.channels() as usize,
    })
}

/// Running input stream feeding a [`CaptureSink`]
///
/// Dropping the capture stops the stream.
pub struct LiveCapture {
    _stream: cpal::Stream,
    info: InputDeviceInfo,
}

impl LiveCapture {
    /// Open the default input device and start streaming into `sink`.
    ///
    /// Multi-channel input is reduced to its first channel.
    pub fn start(sink: CaptureSink) -> Result<Self, CaptureError> {
        let (device, config) = default_device().map_err(|err| {
            log_capture_error(&err, "LiveCapture::start");
            err
        })?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            let err = CaptureError::UnsupportedSampleFormat {
                format: format!("{:?}", config.sample_format()),
            };
            log_capture_error(&err, "LiveCapture::start");
            return Err(err);
        }

        let stream_config: cpal::StreamConfig = config.clone().into();
        let channels = stream_config.channels as usize;
        let info = InputDeviceInfo {
            name: device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate: stream_config.sample_rate.0,
            channels,
        };

        let mut chunker = FrameChunker::new(sink);
        let err_fn = |err| tracing::error!("[LiveCapture] Input stream error: {}", err);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    chunker.push_interleaved(data, channels);
                },
                err_fn,
                None,
            )
            .map_err(|e| CaptureError::StreamOpenFailed {
                reason: format!("{:?}", e),
            })?;
        stream.play().map_err(|e| CaptureError::StreamOpenFailed {
            reason: format!("Failed to start input stream: {:?}", e),
        })?;

        tracing::info!(
            "[LiveCapture] Capturing from '{}' at {} Hz ({} channels)",
            info.name,
            info.sample_rate,
            info.channels
        );
        Ok(Self {
            _stream: stream,
            info,
        })
    }

    pub fn info(&self) -> &InputDeviceInfo {
        &self.info
    }
}
