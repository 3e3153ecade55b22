use std::fmt;

use cpal::{
    OutputCallbackInfo,
    traits::{DeviceTrait as _, HostTrait as _, StreamTrait as _},
};

use crate::{
    device_manager::{AudioDeviceManager, AudioSource, AudioSourceBufferKind, OutputConfig},
    error::{EngineError, EngineResult},
};

/// Plays an [`AudioSource`] on the host's default output device.
#[derive(Default)]
pub struct CpalAudioDeviceManager {
    stream: Option<cpal::Stream>,
}

impl fmt::Debug for CpalAudioDeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpalAudioDeviceManager")
            .field("is_streaming", &self.stream.is_some())
            .finish()
    }
}

impl CpalAudioDeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn default_device() -> EngineResult<(cpal::Device, cpal::SupportedStreamConfig)> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(EngineError::DeviceNotFound)?;

        let config = device
            .default_output_config()
            .map_err(|e| EngineError::StreamBuildFailed(e.to_string()))?;

        Ok((device, config))
    }

    fn build_output_stream<T, C>(
        device: &cpal::Device,
        config: &cpal::SupportedStreamConfig,
        mut cb: C,
    ) -> EngineResult<cpal::Stream>
    where
        T: cpal::SizedSample,
        C: FnMut(&mut [T], usize) + Send + 'static,
    {
        let error_cb = |err| log::error!("Output stream error: {err}");

        let channels = usize::from(config.channels());
        let data_cb = move |data: &mut [T], _: &OutputCallbackInfo| cb(data, channels);

        device
            .build_output_stream(&config.config(), data_cb, error_cb, None)
            .map_err(|e| EngineError::StreamBuildFailed(e.to_string()))
    }
}

impl AudioDeviceManager for CpalAudioDeviceManager {
    fn output_config(&self) -> EngineResult<OutputConfig> {
        let (_, config) = Self::default_device()?;

        Ok(OutputConfig {
            sample_rate: f64::from(config.sample_rate().0),
            channels: usize::from(config.channels()),
        })
    }

    fn start_output_stream(&mut self, mut audio_source: Box<dyn AudioSource>) -> EngineResult<()> {
        let (device, config) = Self::default_device()?;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_output_stream(&device, &config, move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::F32(data), channels);
            })?,
            cpal::SampleFormat::I16 => Self::build_output_stream(&device, &config, move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::I16(data), channels);
            })?,
            cpal::SampleFormat::U16 => Self::build_output_stream(&device, &config, move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::U16(data), channels);
            })?,
            format => {
                return Err(EngineError::UnsupportedFormat(format!("device sample format '{format}'")));
            }
        };

        stream
            .play()
            .map_err(|e| EngineError::StreamStartFailed(e.to_string()))?;

        log::info!(
            "Output stream started: {} Hz, {} channel(s), {}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        self.stream = Some(stream);
        Ok(())
    }
}
