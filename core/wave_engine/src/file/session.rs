use transport::SampleRange;

use crate::{
    buffer::AudioBuffer,
    file::{AudioFile, AudioFileCache, AudioFileReader, ChannelSet},
};

/// A playback node's open stream onto its file.
///
/// Caches the file's sample rate the first time it becomes known; it never
/// changes afterwards, even if the reader reports something else later.
#[derive(Debug)]
pub struct StreamSession {
    reader: Box<dyn AudioFileReader>,
    file_sample_rate: f64,
    loop_range: Option<SampleRange>,
}

impl StreamSession {
    /// `None` while the cache cannot provide a reader; callers retry later.
    pub fn open(cache: &dyn AudioFileCache, file: &AudioFile) -> Option<Self> {
        cache.create_reader(file).map(Self::new)
    }

    pub fn new(reader: Box<dyn AudioFileReader>) -> Self {
        Self {
            reader,
            file_sample_rate: 0.0,
            loop_range: None,
        }
    }

    /// Probes the reader until a rate is reported. 0.0 while unknown.
    pub fn sample_rate(&mut self) -> f64 {
        if self.file_sample_rate <= 0.0 {
            let rate = self.reader.sample_rate();
            if rate > 0.0 {
                log::debug!("Stream sample rate is {rate} Hz");
                self.file_sample_rate = rate;
            }
        }

        self.file_sample_rate
    }

    pub fn has_sample_rate(&self) -> bool {
        self.file_sample_rate > 0.0
    }

    pub fn num_channels(&self) -> usize {
        self.reader.num_channels()
    }

    /// Empty ranges are ignored.
    pub fn set_loop_range(&mut self, range: SampleRange) {
        if range.is_empty() {
            return;
        }

        self.loop_range = Some(range);
        self.reader.set_loop_range(range);
    }

    pub fn loop_range(&self) -> Option<SampleRange> {
        self.loop_range
    }

    pub fn set_read_position(&mut self, position: i64) {
        self.reader.set_read_position(position);
    }

    pub fn read_position(&self) -> i64 {
        self.reader.read_position()
    }

    pub fn read(
        &mut self,
        num_samples: usize,
        dest: &mut AudioBuffer,
        source_channels: ChannelSet,
        retry_budget: u32,
    ) -> bool {
        self.reader
            .read_samples(num_samples, dest, source_channels, retry_budget)
    }
}
