use std::{
    fmt,
    path::{Path, PathBuf},
};

use transport::SampleRange;

use crate::buffer::AudioBuffer;

pub mod session;
pub mod wav;

pub use session::StreamSession;
pub use wav::{WavFileCache, WavFileReader};

/// What is known about a file without reading its audio.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioFileInfo {
    pub num_channels: usize,
    pub sample_rate: f64,
    pub length_in_samples: u64,
}

/// Reference to a recorded audio file.
///
/// A null reference (empty path) stands for a missing file and never yields a reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioFile {
    path: PathBuf,
    info: AudioFileInfo,
}

impl AudioFile {
    /// Probes the file header; a file that cannot be read yet has empty info.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let info = wav::probe(&path).unwrap_or_else(|e| {
            log::debug!("Could not probe {}: {e}", path.display());
            AudioFileInfo::default()
        });

        Self { path, info }
    }

    pub fn with_info(path: impl Into<PathBuf>, info: AudioFileInfo) -> Self {
        Self {
            path: path.into(),
            info,
        }
    }

    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> AudioFileInfo {
        self.info
    }

    pub fn num_channels(&self) -> usize {
        self.info.num_channels
    }
}

/// A set of file channel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSet {
    mask: u64,
}

impl ChannelSet {
    pub const MAX_CHANNELS: usize = 64;

    /// Channels `0..num_channels`, with no gaps.
    pub fn canonical(num_channels: usize) -> Self {
        let mask = match num_channels {
            0 => 0,
            n if n >= Self::MAX_CHANNELS => u64::MAX,
            n => (1_u64 << n) - 1,
        };
        Self { mask }
    }

    pub fn mono() -> Self {
        Self::canonical(1)
    }

    pub fn stereo() -> Self {
        Self::canonical(2)
    }

    pub fn discrete(channels: &[usize]) -> Self {
        let mask = channels
            .iter()
            .filter(|c| **c < Self::MAX_CHANNELS)
            .fold(0, |mask, c| mask | (1_u64 << c));
        Self { mask }
    }

    pub fn size(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn contains(&self, channel: usize) -> bool {
        channel < Self::MAX_CHANNELS && self.mask & (1_u64 << channel) != 0
    }

    /// Channel indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + use<> {
        let mask = self.mask;
        (0..Self::MAX_CHANNELS).filter(move |c| mask & (1_u64 << c) != 0)
    }
}

/// Seekable, chunked access to one file's audio.
///
/// Implemented by the file-cache layer; the playback node only drives it.
pub trait AudioFileReader: Send + fmt::Debug {
    fn num_channels(&self) -> usize;

    /// Native sample rate, or 0.0 while unknown.
    fn sample_rate(&self) -> f64;

    /// Reads at or past `range.end` continue from `range.start`.
    fn set_loop_range(&mut self, range: SampleRange);

    fn set_read_position(&mut self, position: i64);

    fn read_position(&self) -> i64;

    /// Reads `num_samples` frames from the read position into the start of `dest`.
    ///
    /// Destination channel `i` receives the `i`-th channel of `source_channels`;
    /// channels the file lacks, and positions outside the file, read as
    /// silence. Advances the read position. Returns `false` if the data could
    /// not be delivered within `retry_budget` attempts.
    fn read_samples(
        &mut self,
        num_samples: usize,
        dest: &mut AudioBuffer,
        source_channels: ChannelSet,
        retry_budget: u32,
    ) -> bool;
}

/// Hands out readers for files, failing softly while a file is unavailable.
pub trait AudioFileCache: Send + Sync + fmt::Debug {
    fn create_reader(&self, file: &AudioFile) -> Option<Box<dyn AudioFileReader>>;
}

/// Folds positions at or past the loop start back into the loop.
pub(crate) fn wrap_into_loop(position: i64, loop_range: Option<SampleRange>) -> i64 {
    match loop_range {
        Some(range) if !range.is_empty() && position >= range.start => {
            range.start + (position - range.start).rem_euclid(range.length())
        }
        _ => position,
    }
}
