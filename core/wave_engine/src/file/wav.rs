use std::{
    fmt,
    fs::File,
    io::{self, BufReader, Read, Seek},
    path::Path,
};

use hound::{SampleFormat, WavReader, WavSpec};
use transport::SampleRange;

use crate::{
    buffer::AudioBuffer,
    error::{EngineError, EngineResult},
    file::{AudioFile, AudioFileCache, AudioFileInfo, AudioFileReader, ChannelSet, wrap_into_loop},
};

/// Reads the header of a `.wav` file.
pub(crate) fn probe(path: &Path) -> EngineResult<AudioFileInfo> {
    let reader = WavReader::new(BufReader::new(File::open(path)?))?;
    let spec = reader.spec();

    Ok(AudioFileInfo {
        num_channels: spec.channels as usize,
        sample_rate: f64::from(spec.sample_rate),
        length_in_samples: u64::from(reader.duration()),
    })
}

/// `WavFileReader` streams frames from a `.wav` source on demand.
///
/// Supports:
/// - Any channel count
/// - 8/16/24/32-bit integer or 32-bit float samples (converted to `f32`)
/// - Looping over a sample range, with silence outside the file
///
/// Sequential reads continue from the current stream position; anything else
/// seeks. A failed frame is retried from a fresh seek until the caller's
/// retry budget runs out.
pub struct WavFileReader<R> {
    reader: WavReader<R>,
    spec: WavSpec,
    length: i64,
    position: i64,
    loop_range: Option<SampleRange>,
    /// Frame the underlying reader will yield next, if known.
    stream_position: Option<i64>,
    frame: Vec<f32>,
}

impl WavFileReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let file = File::open(path)?;
        Self::new(WavReader::new(BufReader::new(file))?)
    }
}

impl<R: Read + Seek> WavFileReader<R> {
    pub fn new(reader: WavReader<R>) -> EngineResult<Self> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(EngineError::UnsupportedFormat("WAV without channels".into()));
        }
        if spec.sample_format == SampleFormat::Float && spec.bits_per_sample != 32 {
            return Err(EngineError::UnsupportedFormat(format!(
                "{}-bit float WAV",
                spec.bits_per_sample
            )));
        }

        Ok(Self {
            length: i64::from(reader.duration()),
            reader,
            spec,
            position: 0,
            loop_range: None,
            stream_position: Some(0),
            frame: vec![0.0; spec.channels as usize],
        })
    }

    pub fn from_stream(stream: R) -> EngineResult<Self> {
        Self::new(WavReader::new(stream)?)
    }

    pub fn length_in_samples(&self) -> i64 {
        self.length
    }

    fn read_frame_at(&mut self, position: i64) -> hound::Result<()> {
        if self.stream_position != Some(position) {
            self.stream_position = None;
            self.reader.seek(position as u32)?;
        }

        match self.spec.sample_format {
            SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                for slot in &mut self.frame {
                    *slot = samples.next().ok_or_else(unexpected_end)??;
                }
            }
            SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (self.spec.bits_per_sample - 1)) as f32;
                let mut samples = self.reader.samples::<i32>();
                for slot in &mut self.frame {
                    *slot = samples.next().ok_or_else(unexpected_end)?? as f32 * scale;
                }
            }
        }

        self.stream_position = Some(position + 1);
        Ok(())
    }
}

fn unexpected_end() -> hound::Error {
    hound::Error::IoError(io::Error::from(io::ErrorKind::UnexpectedEof))
}

impl<R> fmt::Debug for WavFileReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavFileReader")
            .field("spec", &self.spec)
            .field("length", &self.length)
            .field("position", &self.position)
            .field("loop_range", &self.loop_range)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek + Send> AudioFileReader for WavFileReader<R> {
    fn num_channels(&self) -> usize {
        self.frame.len()
    }

    fn sample_rate(&self) -> f64 {
        f64::from(self.spec.sample_rate)
    }

    fn set_loop_range(&mut self, range: SampleRange) {
        self.loop_range = Some(range).filter(|r| !r.is_empty());
    }

    fn set_read_position(&mut self, position: i64) {
        self.position = position;
    }

    fn read_position(&self) -> i64 {
        self.position
    }

    fn read_samples(
        &mut self,
        num_samples: usize,
        dest: &mut AudioBuffer,
        source_channels: ChannelSet,
        retry_budget: u32,
    ) -> bool {
        dest.clear();

        let start = self.position;
        self.position += num_samples as i64;

        let num_samples = num_samples.min(dest.num_samples());
        let mut attempts = 0;
        let mut i = 0;

        while i < num_samples {
            let position = wrap_into_loop(start + i as i64, self.loop_range);
            if !(0..self.length).contains(&position) {
                i += 1;
                continue;
            }

            if let Err(e) = self.read_frame_at(position) {
                attempts += 1;
                self.stream_position = None;
                if attempts >= retry_budget.max(1) {
                    log::warn!("Giving up WAV read at frame {position} after {attempts} attempts: {e}");
                    return false;
                }
                continue;
            }

            for (dest_channel, source_channel) in
                source_channels.iter().take(dest.num_channels()).enumerate()
            {
                if let Some(sample) = self.frame.get(source_channel) {
                    dest.channel_mut(dest_channel)[i] = *sample;
                }
            }
            i += 1;
        }

        true
    }
}

/// Opens `.wav` files straight from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavFileCache;

impl AudioFileCache for WavFileCache {
    fn create_reader(&self, file: &AudioFile) -> Option<Box<dyn AudioFileReader>> {
        if file.is_null() {
            return None;
        }

        match WavFileReader::open(file.path()) {
            Ok(reader) => Some(Box::new(reader)),
            Err(e) => {
                log::debug!("No reader for {} yet: {e}", file.path().display());
                None
            }
        }
    }
}
