/// Owned, non-interleaved multi-channel sample storage.
///
/// Buffers are sized in `prepare_to_play` and then reused block after
/// block; `resize` only allocates when a dimension grows.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    num_samples: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels],
            num_samples,
        }
    }

    /// Resizes and clears the buffer.
    pub fn resize(&mut self, num_channels: usize, num_samples: usize) {
        self.channels.resize_with(num_channels, Vec::new);
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(num_samples, 0.0);
        }
        self.num_samples = num_samples;
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.channels[channel]
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// A view over every channel and the whole length of the buffer.
    pub fn block(&mut self) -> AudioBlock<'_> {
        let len = self.num_samples;
        AudioBlock {
            channels: &mut self.channels,
            start: 0,
            len,
        }
    }

    /// A view over every channel and the first `len` samples.
    pub fn block_of_length(&mut self, len: usize) -> AudioBlock<'_> {
        let len = len.min(self.num_samples);
        AudioBlock {
            channels: &mut self.channels,
            start: 0,
            len,
        }
    }
}

/// Mutable view onto a window of frames and a run of channels of an [`AudioBuffer`].
#[derive(Debug)]
pub struct AudioBlock<'a> {
    channels: &'a mut [Vec<f32>],
    start: usize,
    len: usize,
}

impl AudioBlock<'_> {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.len
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel][self.start..self.start + self.len]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.channels[channel][self.start..self.start + self.len]
    }

    pub fn clear(&mut self) {
        let len = self.len;
        self.clear_frames(0, len);
    }

    /// Zeroes `len` frames starting at `start`, clamped to the block.
    pub fn clear_frames(&mut self, start: usize, len: usize) {
        let from = start.min(self.len);
        let to = start.saturating_add(len).min(self.len);

        for channel in 0..self.num_channels() {
            self.channel_mut(channel)[from..to].fill(0.0);
        }
    }

    /// Reborrows the block limited to `count` channels starting at `first`.
    pub fn subset_channels(&mut self, first: usize, count: usize) -> AudioBlock<'_> {
        let first = first.min(self.channels.len());
        let last = (first + count).min(self.channels.len());
        AudioBlock {
            channels: &mut self.channels[first..last],
            start: self.start,
            len: self.len,
        }
    }

    /// Reborrows `len` frames starting at `start`, clamped to the block.
    pub fn sub_block(&mut self, start: usize, len: usize) -> AudioBlock<'_> {
        let start = start.min(self.len);
        let len = len.min(self.len - start);
        AudioBlock {
            channels: &mut *self.channels,
            start: self.start + start,
            len,
        }
    }

    pub fn reborrow(&mut self) -> AudioBlock<'_> {
        AudioBlock {
            channels: &mut *self.channels,
            start: self.start,
            len: self.len,
        }
    }

    /// Copies the leading samples of `source` over this block.
    pub fn copy_from(&mut self, source: &AudioBuffer) {
        let len = self.len.min(source.num_samples());
        for channel in 0..self.num_channels().min(source.num_channels()) {
            self.channel_mut(channel)[..len].copy_from_slice(&source.channel(channel)[..len]);
        }
    }

    /// Sums the leading samples of `source` into this block.
    pub fn add_from(&mut self, source: &AudioBuffer) {
        let len = self.len.min(source.num_samples());
        for channel in 0..self.num_channels().min(source.num_channels()) {
            let src = &source.channel(channel)[..len];
            for (dest, src) in self.channel_mut(channel).iter_mut().zip(src) {
                *dest += src;
            }
        }
    }
}

/// A short MIDI message stamped with its offset, in seconds, from the start of the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiMessage {
    bytes: [u8; 3],
    len: u8,
    pub timestamp: f64,
}

impl MidiMessage {
    /// Takes at most the first three bytes of `data`.
    pub fn from_bytes(data: &[u8], timestamp: f64) -> Self {
        let mut bytes = [0; 3];
        let len = data.len().min(3);
        bytes[..len].copy_from_slice(&data[..len]);

        Self {
            bytes,
            len: len as u8,
            timestamp,
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8, timestamp: f64) -> Self {
        Self::from_bytes(&[0x90 | (channel & 0x0f), note & 0x7f, velocity & 0x7f], timestamp)
    }

    pub fn note_off(channel: u8, note: u8, timestamp: f64) -> Self {
        Self::from_bytes(&[0x80 | (channel & 0x0f), note & 0x7f, 0], timestamp)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MidiBuffer {
    messages: Vec<MidiMessage>,
}

impl MidiBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, message: MidiMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.messages.clear();
        self.messages.extend_from_slice(&other.messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MidiMessage> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MidiBuffer {
    type Item = &'a MidiMessage;
    type IntoIter = std::slice::Iter<'a, MidiMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
