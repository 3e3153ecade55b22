use crate::error::EngineResult;

pub mod cpal_dm;

/// Interleaved device buffer in whichever sample format the device asked for.
#[derive(Debug)]
pub enum AudioSourceBufferKind<'a> {
    F32(&'a mut [f32]),
    I16(&'a mut [i16]),
    U16(&'a mut [u16]),
}

/// Something the device callback can pull interleaved audio from.
pub trait AudioSource: Send {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, channels: usize);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputConfig {
    pub sample_rate: f64,
    pub channels: usize,
}

pub trait AudioDeviceManager {
    /// Format the next output stream will be opened with.
    fn output_config(&self) -> EngineResult<OutputConfig>;

    fn start_output_stream(&mut self, audio_source: Box<dyn AudioSource>) -> EngineResult<()>;
}
