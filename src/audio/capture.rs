// CaptureEngine - cpal input stream feeding the spectrum history
//
// The capture callback runs on the audio thread. Per completed block it
// takes the history lock once and performs the whole write (sample copy +
// in-place transform) under it, so the analysis loop can never observe a
// half-written slot. The critical section must stay well under one block's
// playback duration or capture will glitch.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

use crate::audio::block::BlockAssembler;
use crate::config::AnalyzerConfig;
use crate::error::CaptureError;
use crate::spectrum::SpectrumHistory;

pub struct CaptureEngine {
    stream: cpal::Stream,
    device_name: String,
}

/// Names of all available input devices on the default host.
pub fn input_device_names() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|err| CaptureError::DeviceEnumerationFailed {
            reason: format!("{}", err),
        })?;
    Ok(devices
        .map(|device| device.name().unwrap_or_else(|_| "unknown".to_string()))
        .collect())
}

impl CaptureEngine {
    /// Open the default input device and start capturing into `history`.
    ///
    /// Requires the device's F32 sample format; multi-channel streams are
    /// reduced to channel 0. The stream is playing when this returns.
    pub fn start(
        history: Arc<Mutex<SpectrumHistory>>,
        config: &AnalyzerConfig,
    ) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let default_config =
            device
                .default_input_config()
                .map_err(|err| CaptureError::StreamOpenFailed {
                    reason: format!("no default input config: {}", err),
                })?;

        if default_config.sample_format() != cpal::SampleFormat::F32 {
            return Err(CaptureError::UnsupportedFormat {
                format: format!("{:?}", default_config.sample_format()),
            });
        }

        let channels = default_config.channels() as usize;
        let stream_config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate: cpal::SampleRate(config.frequency),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut assembler = BlockAssembler::new(config.samples_per_block);
        let data_callback = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            assembler.push_interleaved(data, channels, |block| {
                // A poisoned lock means the analysis side panicked; drop the
                // block rather than panic the audio thread too.
                match history.lock() {
                    Ok(mut history) => history.write(block),
                    Err(_) => log::error!("spectrum history lock poisoned, dropping block"),
                }
            });
        };
        let err_fn = |err| log::error!("input stream error: {}", err);

        let stream = device
            .build_input_stream(&stream_config, data_callback, err_fn, None)
            .map_err(|err| CaptureError::StreamOpenFailed {
                reason: format!("{}", err),
            })?;

        stream.play().map_err(|err| CaptureError::StreamStartFailed {
            reason: format!("{}", err),
        })?;

        log::info!(
            "capturing from \"{}\" at {} Hz, {} samples per block",
            device_name,
            config.frequency,
            config.samples_per_block
        );

        Ok(Self {
            stream,
            device_name,
        })
    }

    /// Stop invoking the capture callback without tearing the stream down.
    pub fn pause(&self) -> Result<(), CaptureError> {
        self.stream
            .pause()
            .map_err(|err| CaptureError::StreamControlFailed {
                reason: format!("{}", err),
            })
    }

    pub fn resume(&self) -> Result<(), CaptureError> {
        self.stream
            .play()
            .map_err(|err| CaptureError::StreamControlFailed {
                reason: format!("{}", err),
            })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}
