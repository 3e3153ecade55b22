use std::sync::Arc;

use transport::{
    SampleRange,
    time::{sample_range_to_time_range, time_range_to_sample_range},
};

use crate::{
    buffer::AudioBuffer,
    clip::{ClipLevel, ClipPlacement, DeclickFade, TimeMapper},
    constants::{OFFLINE_READ_RETRIES, REALTIME_READ_RETRIES, RESAMPLER_GUARD_SAMPLES, SCRUB_ATTENUATION},
    file::{AudioFile, AudioFileCache, ChannelSet, StreamSession},
    graph::{Node, NodeId, NodeProperties, PlaybackInitialisationInfo, ProcessContext},
    resampler::ChannelState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveNodeState {
    /// `prepare_to_play` has not run yet.
    Unprepared,
    /// Waiting for the file to open or report its sample rate.
    Preparing,
    Ready,
}

/// `WaveNode` plays one recorded file placed on the timeline.
///
/// Every block it:
/// - maps the block's timeline range onto the file through the clip placement
/// - reads that file section, plus two guard samples, from its stream session
/// - resamples it per channel onto the destination, adding to what is there
/// - applies clip gain/pan and fades over discontinuities
/// - zeroes anything outside the clip's edit range
///
/// A missing file never stalls the graph: the node reports itself ready and
/// renders nothing.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use wave_engine::{clip::{ClipLevel, ClipPlacement}, file::{AudioFile, ChannelSet, WavFileCache}, nodes::WaveNode};
///
/// let node = WaveNode::new(
///     AudioFile::new("assets/wav/piano.wav"),
///     ClipPlacement::simple(1.0, 3.0).unwrap(),
///     ClipLevel::default(),
///     ChannelSet::stereo(),
///     Arc::new(WavFileCache),
///     false,
/// );
/// ```
#[derive(Debug)]
pub struct WaveNode {
    node_id: NodeId,
    audio_file: AudioFile,
    placement: ClipPlacement,
    level: ClipLevel,
    channels_to_use: ChannelSet,
    cache: Arc<dyn AudioFileCache>,
    is_offline_render: bool,

    session: Option<StreamSession>,
    /// Only exists once the file's sample rate is known.
    time_mapper: Option<TimeMapper>,
    output_sample_rate: f64,
    edit_range_in_samples: SampleRange,
    channel_state: Vec<ChannelState>,
    file_data: AudioBuffer,
    prepared: bool,
}

impl WaveNode {
    pub fn new(
        audio_file: AudioFile,
        placement: ClipPlacement,
        level: ClipLevel,
        channels_to_use: ChannelSet,
        cache: Arc<dyn AudioFileCache>,
        is_offline_render: bool,
    ) -> Self {
        Self {
            node_id: NodeId::new(),
            audio_file,
            placement,
            level,
            channels_to_use,
            cache,
            is_offline_render,
            session: None,
            time_mapper: None,
            output_sample_rate: 0.0,
            edit_range_in_samples: SampleRange::default(),
            channel_state: Vec::new(),
            file_data: AudioBuffer::default(),
            prepared: false,
        }
    }

    pub fn state(&self) -> WaveNodeState {
        if !self.prepared {
            WaveNodeState::Unprepared
        } else if self.audio_file.is_null() || self.time_mapper.is_some() {
            WaveNodeState::Ready
        } else {
            WaveNodeState::Preparing
        }
    }

    pub fn placement(&self) -> &ClipPlacement {
        &self.placement
    }

    fn retry_budget(&self) -> u32 {
        if self.is_offline_render {
            OFFLINE_READ_RETRIES
        } else {
            REALTIME_READ_RETRIES
        }
    }

    /// File channels clamped to `1..=max(requested, 1)`.
    ///
    /// Until the file has been probed or opened the requested count is used.
    fn number_of_channels(&self) -> usize {
        let requested = self.channels_to_use.size().max(1);
        let file_channels = self
            .session
            .as_ref()
            .map_or(self.audio_file.num_channels(), StreamSession::num_channels);

        if file_channels == 0 {
            requested
        } else {
            file_channels.clamp(1, requested)
        }
    }

    /// Keeps one resampler state per negotiated channel once the real count is known.
    fn fit_channel_state(&mut self) {
        let num_channels = self.number_of_channels();
        if self.channel_state.len() != num_channels {
            self.channel_state.resize(num_channels, ChannelState::default());
            self.file_data.resize(num_channels, self.file_data.num_samples());
        }
    }

    fn open_session(&mut self) -> bool {
        if self.session.is_none() {
            self.session = StreamSession::open(self.cache.as_ref(), &self.audio_file);
            if self.session.is_some() {
                log::debug!("Opened stream for {}", self.audio_file.path().display());
            }
        }

        self.session.is_some()
    }

    /// Picks up the file's sample rate and applies the loop range once it is known.
    fn update_file_sample_rate(&mut self) -> bool {
        if self.time_mapper.is_some() {
            return true;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let file_sample_rate = session.sample_rate();
        if file_sample_rate <= 0.0 {
            return false;
        }

        if let Some(loop_range) = self.placement.scaled_loop_range() {
            session.set_loop_range(time_range_to_sample_range(loop_range, file_sample_rate));
        }

        self.time_mapper = Some(TimeMapper::new(&self.placement, file_sample_rate));
        true
    }

    fn process_section(&mut self, context: &mut ProcessContext<'_>, timeline_range: SampleRange) {
        let section = sample_range_to_time_range(timeline_range, self.output_sample_rate);
        let edit_range = self.placement.edit_range();

        if self.session.is_none()
            || section.end <= edit_range.start
            || section.start >= edit_range.end
        {
            return;
        }

        if !self.update_file_sample_rate() {
            return;
        }

        let retry_budget = self.retry_budget();
        let (Some(mapper), Some(session)) = (self.time_mapper, self.session.as_mut()) else {
            return;
        };

        let file_start = mapper.edit_time_to_file_sample(section.start);
        let file_end = mapper.edit_time_to_file_sample(section.end);
        let num_file_samples = file_end - file_start;

        let dest = &mut context.buffers.audio;
        let num_samples = dest.num_samples();
        let num_channels = dest.num_channels();

        if num_samples == 0 || num_file_samples <= 0 {
            return;
        }

        let ratio = num_file_samples as f64 / num_samples as f64;
        let num_to_read = num_file_samples as usize + RESAMPLER_GUARD_SAMPLES;

        session.set_read_position(file_start);
        self.file_data.resize(num_channels, num_to_read);

        let fade = if session.read(num_to_read, &mut self.file_data, self.channels_to_use, retry_budget) {
            DeclickFade::after_read(context.play_head_state, num_samples)
        } else {
            self.file_data.clear();
            DeclickFade::after_failed_read(num_samples)
        };

        let mut gains = if num_channels == 2 {
            let (left, right) = self.level.left_and_right_gains();
            [left, right]
        } else {
            [self.level.gain_including_mute(); 2]
        };

        if context.play_head_state.is_user_dragging() {
            gains = gains.map(|gain| gain * SCRUB_ATTENUATION);
        }

        for channel in 0..num_channels {
            let Some(state) = self.channel_state.get_mut(channel) else {
                dest.subset_channels(channel, 1).clear();
                continue;
            };

            let out = dest.channel_mut(channel);
            state
                .resampler
                .process_adding(ratio, self.file_data.channel(channel), out, gains[channel & 1]);

            fade.apply(out, state.last_sample);
            state.last_sample = out[num_samples - 1];
        }

        let num_to_clear_at_start = self.edit_range_in_samples.start - timeline_range.start;
        let num_to_clear_at_end = timeline_range.end - self.edit_range_in_samples.end;

        if num_to_clear_at_start > 0 {
            dest.clear_frames(0, num_to_clear_at_start as usize);
        }

        if num_to_clear_at_end > 0 {
            let num_to_clear_at_end = num_to_clear_at_end as usize;
            dest.clear_frames(num_samples.saturating_sub(num_to_clear_at_end), num_to_clear_at_end);
        }
    }
}

impl Node for WaveNode {
    fn node_properties(&self) -> NodeProperties {
        NodeProperties {
            has_audio: true,
            has_midi: false,
            number_of_channels: self.number_of_channels(),
            node_id: self.node_id,
        }
    }

    fn prepare_to_play(&mut self, info: &PlaybackInitialisationInfo) {
        self.session = None;
        self.time_mapper = None;
        self.open_session();

        self.output_sample_rate = info.sample_rate;
        self.edit_range_in_samples = self.placement.edit_range_in_samples(info.sample_rate);
        self.update_file_sample_rate();

        let num_channels = self.number_of_channels();
        self.channel_state = vec![ChannelState::default(); num_channels];

        let max_ratio = self.time_mapper.map_or(1.0, |mapper| {
            self.placement.speed_ratio() * mapper.file_sample_rate() / info.sample_rate
        });
        let estimated_file_samples = (info.block_size as f64 * max_ratio).ceil() as usize + RESAMPLER_GUARD_SAMPLES + 1;
        self.file_data.resize(num_channels, estimated_file_samples);

        self.prepared = true;
        log::debug!(
            "Prepared wave node {} at {} Hz, {num_channels} channel(s), state {:?}",
            self.node_id,
            info.sample_rate,
            self.state()
        );
    }

    fn is_ready_to_process(&mut self) -> bool {
        // a null file never gets a reader, render silence instead of stalling
        if self.audio_file.is_null() {
            return true;
        }

        let ready = self.open_session() && self.update_file_sample_rate();
        if ready {
            self.fit_channel_state();
        }
        ready
    }

    fn process(&mut self, context: &mut ProcessContext<'_>) {
        let split = context
            .play_head_state
            .play_head
            .reference_sample_range_to_split_timeline_range(context.stream_sample_range);
        debug_assert!(!split.is_split, "loop-crossing blocks must be split before reaching nodes");

        self.process_section(context, split.timeline_range1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use transport::{PlayHead, PlayHeadState, TimeRange};

    use super::*;
    use crate::{
        buffer::MidiBuffer,
        constants::AUDIO_SAMPLE_EPSILON,
        file::test_support::{MemoryFileCache, MemoryReader},
        graph::ProcessBuffers,
    };

    const RATE: f64 = 48000.0;
    const BLOCK: usize = 512;

    fn info() -> PlaybackInitialisationInfo {
        PlaybackInitialisationInfo {
            sample_rate: RATE,
            block_size: BLOCK,
        }
    }

    fn wave_node(reader: MemoryReader, placement: ClipPlacement, channels: ChannelSet) -> WaveNode {
        let mut node = WaveNode::new(
            AudioFile::with_info("take.wav", Default::default()),
            placement,
            ClipLevel::default(),
            channels,
            Arc::new(MemoryFileCache::new(reader)),
            false,
        );
        node.prepare_to_play(&info());
        node
    }

    /// Playhead running from timeline 0, with `blocks` already processed.
    fn play_head_state(blocks: &[SampleRange]) -> PlayHeadState {
        let mut play_head = PlayHead::new();
        play_head.play();

        let mut state = PlayHeadState::new(play_head);
        for block in blocks {
            state.update(*block);
        }
        state
    }

    fn render(node: &mut WaveNode, state: &PlayHeadState, range: SampleRange, buffer: &mut AudioBuffer) {
        let mut midi = MidiBuffer::default();
        let mut context = ProcessContext {
            stream_sample_range: range,
            play_head_state: state,
            buffers: ProcessBuffers {
                audio: buffer.block(),
                midi: &mut midi,
            },
        };

        node.process(&mut context);
    }

    fn block_at(start: i64) -> SampleRange {
        SampleRange::with_start_and_length(start, BLOCK as i64)
    }

    #[test]
    fn test_block_before_edit_start_is_untouched() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(1.0, 3.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut buffer = AudioBuffer::new(1, BLOCK);
        buffer.channel_mut(0).fill(0.25);

        let state = play_head_state(&[block_at(0)]);
        render(&mut node, &state, block_at(0), &mut buffer);

        assert!(buffer.channel(0).iter().all(|s| *s == 0.25));
    }

    #[test]
    fn test_block_at_edit_start_reads_file_from_zero() {
        let mut node = wave_node(
            MemoryReader::ramp(96000, RATE),
            ClipPlacement::simple(1.0, 3.0).unwrap(),
            ChannelSet::mono(),
        );
        let ramp = |i: usize| i as f32 / 96000.0;

        let mut buffer = AudioBuffer::new(1, BLOCK);
        let state = play_head_state(&[block_at(48000 - BLOCK as i64), block_at(48000)]);
        assert!(state.is_contiguous_with_previous_block());

        render(&mut node, &state, block_at(48000), &mut buffer);

        // two samples of interpolator latency, then the file verbatim with no fade
        let out = buffer.channel(0);
        for i in 2..BLOCK {
            assert!((out[i] - ramp(i - 2)).abs() < AUDIO_SAMPLE_EPSILON, "sample {i}");
        }
    }

    #[test]
    fn test_jump_fades_in_from_last_sample() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut buffer = AudioBuffer::new(1, BLOCK);
        let state = play_head_state(&[block_at(4096)]);
        render(&mut node, &state, block_at(4096), &mut buffer);

        let out = buffer.channel(0);
        assert!((out[5] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((out[10] - 1.0).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_first_block_of_loop_is_not_faded() {
        let loop_len = 24000;
        let placement = ClipPlacement::new(
            TimeRange::new(1.0, 3.0),
            0.0,
            Some(TimeRange::new(0.0, 0.5)),
            1.0,
        )
        .unwrap();
        let mut node = wave_node(MemoryReader::ramp(96000, RATE), placement, ChannelSet::mono());
        let ramp = |i: usize| i as f32 / 96000.0;

        let mut play_head = PlayHead::new();
        play_head.play();
        play_head.set_loop_range(Some(SampleRange::new(48000, 48000 + loop_len)));
        play_head.set_position(48000 + loop_len - BLOCK as i64, 0);
        let mut state = PlayHeadState::new(play_head);

        let mut buffer = AudioBuffer::new(1, BLOCK);
        state.update(block_at(0));
        render(&mut node, &state, block_at(0), &mut buffer);
        let last_before_wrap = buffer.channel(0)[BLOCK - 1];
        assert!(last_before_wrap > 0.2);

        buffer.clear();
        state.update(block_at(BLOCK as i64));
        assert!(state.is_first_block_of_loop());
        render(&mut node, &state, block_at(BLOCK as i64), &mut buffer);

        let out = buffer.channel(0);
        for i in 2..BLOCK {
            assert!((out[i] - ramp(i - 2)).abs() < AUDIO_SAMPLE_EPSILON, "sample {i}");
        }
    }

    #[test]
    fn test_mono_file_negotiates_one_channel_and_clears_the_rest() {
        let mut node = wave_node(
            MemoryReader::constant(0.5, 1, 96000, RATE),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ChannelSet::stereo(),
        );
        assert_eq!(node.node_properties().number_of_channels, 1);

        let mut buffer = AudioBuffer::new(2, BLOCK);
        buffer.channel_mut(1).fill(0.9);

        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        assert!((buffer.channel(0)[100] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(buffer.channel(1).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_stereo_uses_pan_gains() {
        let mut node = WaveNode::new(
            AudioFile::with_info("take.wav", Default::default()),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ClipLevel::new(0.0, -1.0),
            ChannelSet::stereo(),
            Arc::new(MemoryFileCache::new(MemoryReader::constant(0.5, 2, 96000, RATE))),
            false,
        );
        node.prepare_to_play(&info());
        assert_eq!(node.node_properties().number_of_channels, 2);

        let mut buffer = AudioBuffer::new(2, BLOCK);
        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        assert!((buffer.channel(0)[100] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(buffer.channel(1).iter().all(|s| s.abs() < AUDIO_SAMPLE_EPSILON));
    }

    #[test]
    fn test_output_is_added_to_destination() {
        let mut node = wave_node(
            MemoryReader::constant(0.5, 1, 96000, RATE),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut buffer = AudioBuffer::new(1, BLOCK);
        buffer.channel_mut(0).fill(0.25);

        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        assert!((buffer.channel(0)[100] - 0.75).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_failed_read_fades_to_silence() {
        let reader = MemoryReader::constant(1.0, 1, 96000, RATE);
        let failing = reader.failing.clone();
        let mut node = wave_node(reader, ClipPlacement::simple(0.0, 2.0).unwrap(), ChannelSet::mono());

        let mut buffer = AudioBuffer::new(1, BLOCK);
        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);
        assert!((buffer.channel(0)[BLOCK - 1] - 1.0).abs() < AUDIO_SAMPLE_EPSILON);

        failing.store(true, Ordering::SeqCst);
        buffer.clear();
        let state = play_head_state(&[block_at(512), block_at(1024)]);
        render(&mut node, &state, block_at(1024), &mut buffer);

        let out = buffer.channel(0);
        assert!((out[10] - 0.75).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((out[39] - 1.0 / 40.0).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(out[40..].iter().all(|s| s.abs() < AUDIO_SAMPLE_EPSILON));
    }

    #[test]
    fn test_scrubbing_attenuates() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut play_head = PlayHead::new();
        play_head.play();
        play_head.set_user_dragging(true);
        let mut state = PlayHeadState::new(play_head);
        state.update(block_at(0));

        let mut buffer = AudioBuffer::new(1, BLOCK);
        render(&mut node, &state, block_at(0), &mut buffer);

        let out = buffer.channel(0);
        assert!((out[20] - 0.2).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((out[100] - SCRUB_ATTENUATION).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_samples_after_edit_end_are_zeroed() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(1.0, 1.005).unwrap(),
            ChannelSet::mono(),
        );

        let mut buffer = AudioBuffer::new(1, BLOCK);
        let state = play_head_state(&[block_at(48000 - BLOCK as i64), block_at(48000)]);
        render(&mut node, &state, block_at(48000), &mut buffer);

        let out = buffer.channel(0);
        assert!((out[200] - 1.0).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(out[240..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_samples_before_edit_start_are_zeroed() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(1.0, 2.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut buffer = AudioBuffer::new(1, BLOCK);
        buffer.channel_mut(0).fill(0.3);
        let start = 48000 - 100;
        let state = play_head_state(&[block_at(start - BLOCK as i64), block_at(start)]);
        render(&mut node, &state, block_at(start), &mut buffer);

        let out = buffer.channel(0);
        assert!(out[..100].iter().all(|s| *s == 0.0));
        assert!(out[300] > 1.0);
    }

    #[test]
    fn test_null_file_is_ready_and_silent() {
        let mut node = WaveNode::new(
            AudioFile::null(),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ClipLevel::default(),
            ChannelSet::stereo(),
            Arc::new(MemoryFileCache::unavailable(MemoryReader::constant(1.0, 1, 16, RATE))),
            false,
        );
        assert_eq!(node.state(), WaveNodeState::Unprepared);

        node.prepare_to_play(&info());
        assert!(node.is_ready_to_process());
        assert_eq!(node.state(), WaveNodeState::Ready);
        assert_eq!(node.node_properties().number_of_channels, 2);

        let mut buffer = AudioBuffer::new(2, BLOCK);
        let state = play_head_state(&[block_at(0)]);
        render(&mut node, &state, block_at(0), &mut buffer);
        assert!(buffer.channel(0).iter().all(|s| *s == 0.0));
        assert!(buffer.channel(1).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_unavailable_file_defers_until_it_appears() {
        let cache = Arc::new(MemoryFileCache::unavailable(MemoryReader::constant(1.0, 1, 96000, RATE)));
        let mut node = WaveNode::new(
            AudioFile::with_info("proxy.wav", Default::default()),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ClipLevel::default(),
            ChannelSet::mono(),
            cache.clone(),
            false,
        );

        node.prepare_to_play(&info());
        assert!(!node.is_ready_to_process());
        assert_eq!(node.state(), WaveNodeState::Preparing);

        cache.available.store(true, Ordering::SeqCst);
        assert!(node.is_ready_to_process());
        assert_eq!(node.state(), WaveNodeState::Ready);
    }

    #[test]
    fn test_retry_budget_follows_render_mode() {
        let node = |offline| {
            WaveNode::new(
                AudioFile::null(),
                ClipPlacement::simple(0.0, 1.0).unwrap(),
                ClipLevel::default(),
                ChannelSet::mono(),
                Arc::new(MemoryFileCache::new(MemoryReader::constant(0.0, 1, 16, RATE))),
                offline,
            )
        };

        assert_eq!(node(false).retry_budget(), 3);
        assert_eq!(node(true).retry_budget(), 5000);
    }

    #[test]
    fn test_double_speed_consumes_file_twice_as_fast() {
        let placement = ClipPlacement::new(TimeRange::new(0.0, 2.0), 0.0, None, 2.0).unwrap();
        let mut node = wave_node(MemoryReader::ramp(192_000, RATE), placement, ChannelSet::mono());

        let mut buffer = AudioBuffer::new(1, BLOCK);
        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        // the block starts 1024 samples into the file
        let step = 1.0 / 192_000.0;
        let out = buffer.channel(0);
        assert!(out[100] > 1024.0 * step);
        assert!((out[101] - out[100] - 2.0 * step).abs() < 1e-5);
    }

    #[test]
    fn test_stereo_file_opened_late_should_render_both_channels() {
        let cache = Arc::new(MemoryFileCache::unavailable(MemoryReader::constant(0.5, 2, 96000, RATE)));
        let mut node = WaveNode::new(
            AudioFile::with_info("proxy.wav", Default::default()),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ClipLevel::default(),
            ChannelSet::stereo(),
            cache.clone(),
            false,
        );

        node.prepare_to_play(&info());
        assert!(!node.is_ready_to_process());
        assert_eq!(node.node_properties().number_of_channels, 2);

        cache.available.store(true, Ordering::SeqCst);
        assert!(node.is_ready_to_process());
        assert_eq!(node.node_properties().number_of_channels, 2);
        assert_eq!(node.channel_state.len(), 2);

        let mut buffer = AudioBuffer::new(2, BLOCK);
        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        assert!((buffer.channel(0)[100] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((buffer.channel(1)[100] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_mono_file_opened_late_should_clear_extra_channels() {
        let cache = Arc::new(MemoryFileCache::unavailable(MemoryReader::constant(0.5, 1, 96000, RATE)));
        let mut node = WaveNode::new(
            AudioFile::with_info("proxy.wav", Default::default()),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ClipLevel::default(),
            ChannelSet::stereo(),
            cache.clone(),
            false,
        );
        node.prepare_to_play(&info());

        cache.available.store(true, Ordering::SeqCst);
        assert!(node.is_ready_to_process());
        assert_eq!(node.node_properties().number_of_channels, 1);

        let mut buffer = AudioBuffer::new(2, BLOCK);
        buffer.channel_mut(1).fill(0.9);
        let state = play_head_state(&[block_at(0), block_at(512)]);
        render(&mut node, &state, block_at(512), &mut buffer);

        assert!((buffer.channel(0)[100] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(buffer.channel(1).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_empty_file_section_should_leave_destination_untouched() {
        // 512 timeline samples cover 0.05 file samples, which round to the same index
        let placement = ClipPlacement::new(TimeRange::new(0.0, 2.0), 0.0, None, 1e-4).unwrap();
        let mut node = wave_node(MemoryReader::constant(1.0, 1, 96000, RATE), placement, ChannelSet::mono());

        let mut buffer = AudioBuffer::new(1, BLOCK);
        buffer.channel_mut(0).fill(0.25);

        let state = play_head_state(&[block_at(0)]);
        render(&mut node, &state, block_at(0), &mut buffer);

        assert!(buffer.channel(0).iter().all(|s| *s == 0.25));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "loop-crossing blocks must be split")]
    fn test_loop_crossing_stream_range_should_panic() {
        let mut node = wave_node(
            MemoryReader::constant(1.0, 1, 96000, RATE),
            ClipPlacement::simple(0.0, 2.0).unwrap(),
            ChannelSet::mono(),
        );

        let mut play_head = PlayHead::new();
        play_head.play();
        play_head.set_loop_range(Some(SampleRange::new(0, 1000)));
        play_head.set_position(900, 0);
        let state = PlayHeadState::new(play_head);

        let mut buffer = AudioBuffer::new(1, BLOCK);
        render(&mut node, &state, block_at(0), &mut buffer);
    }
}
