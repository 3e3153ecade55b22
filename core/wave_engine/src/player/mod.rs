use cpal::Sample;
use rtrb::RingBuffer;
use transport::{PlayHead, PlayHeadState, SampleRange};

use crate::{
    buffer::{AudioBuffer, MidiBuffer},
    device_manager::{AudioSource, AudioSourceBufferKind},
    graph::{Node, PlaybackInitialisationInfo, ProcessBuffers, ProcessContext, visit_nodes},
    player::command::{TransportCommand, TransportCommandConsumer, TransportCommandProducer},
};

pub mod command;

/// Drives a node graph block by block against the reference clock.
///
/// Blocks that cross the loop end are split into two contiguous sub-calls,
/// with the playhead state refreshed before each, so nodes never see a
/// wrapped range.
#[derive(Debug)]
pub struct NodePlayer {
    root: Box<dyn Node>,
    play_head_state: PlayHeadState,
    commands: TransportCommandConsumer,
    /// Reference sample at the start of the next block.
    reference_position: i64,
    num_channels: usize,
    block_size: usize,
    output: AudioBuffer,
    midi: MidiBuffer,
}

impl NodePlayer {
    pub fn new(root: Box<dyn Node>, commands: TransportCommandConsumer) -> Self {
        let num_channels = root.node_properties().number_of_channels.max(1);

        Self {
            root,
            play_head_state: PlayHeadState::new(PlayHead::new()),
            commands,
            reference_position: 0,
            num_channels,
            block_size: 0,
            output: AudioBuffer::default(),
            midi: MidiBuffer::default(),
        }
    }

    /// Creates a player together with the producer end of its command queue.
    pub fn with_command_queue(root: Box<dyn Node>, capacity: usize) -> (Self, TransportCommandProducer) {
        let (producer, consumer) = RingBuffer::new(capacity);
        (Self::new(root, consumer), producer)
    }

    /// Prepares every node in the graph, inputs first.
    pub fn prepare(&mut self, info: &PlaybackInitialisationInfo) {
        visit_nodes(self.root.as_mut(), &mut |node: &mut dyn Node| node.prepare_to_play(info));

        self.num_channels = self.root.node_properties().number_of_channels.max(1);
        self.block_size = info.block_size.max(1);
        self.output.resize(self.num_channels, self.block_size);
        self.midi = MidiBuffer::with_capacity(256);
        self.play_head_state.reset();

        log::debug!(
            "Prepared graph at {} Hz, {} sample blocks, {} channel(s)",
            info.sample_rate,
            self.block_size,
            self.num_channels
        );
    }

    pub fn play_head(&self) -> &PlayHead {
        &self.play_head_state.play_head
    }

    pub fn reference_position(&self) -> i64 {
        self.reference_position
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Output of the last `process` call.
    pub fn output(&self) -> &AudioBuffer {
        &self.output
    }

    pub fn handle_command(&mut self, command: TransportCommand) {
        let play_head = &mut self.play_head_state.play_head;

        match command {
            TransportCommand::Play => play_head.play(),
            TransportCommand::Stop => play_head.stop(),
            TransportCommand::SetPosition(timeline_position) => {
                play_head.set_position(timeline_position, self.reference_position);
            }
            TransportCommand::SetLoopRange(range) => play_head.set_loop_range(range),
            TransportCommand::SetUserDragging(dragging) => play_head.set_user_dragging(dragging),
        }
    }

    /// Renders the next `num_samples` reference samples into the output buffer.
    ///
    /// Renders silence while stopped or while any node is not ready yet.
    pub fn process(&mut self, num_samples: usize) {
        while let Ok(command) = self.commands.pop() {
            self.handle_command(command);
        }

        if self.output.num_channels() != self.num_channels || self.output.num_samples() < num_samples {
            self.output.resize(self.num_channels, num_samples);
        } else {
            self.output.clear();
        }

        let reference_range = SampleRange::with_start_and_length(self.reference_position, num_samples as i64);
        self.reference_position = reference_range.end;

        if !self.play_head_state.play_head.is_playing() || !self.is_graph_ready() {
            self.play_head_state.reset();
            return;
        }

        let split = self
            .play_head_state
            .play_head
            .reference_sample_range_to_split_timeline_range(reference_range);

        if split.is_split {
            let first_length = split.timeline_range1.length();
            let first = SampleRange::with_start_and_length(reference_range.start, first_length);
            let second = SampleRange::new(first.end, reference_range.end);

            self.process_sub_range(first, 0);
            self.process_sub_range(second, first_length as usize);
        } else {
            self.process_sub_range(reference_range, 0);
        }
    }

    fn is_graph_ready(&mut self) -> bool {
        let mut ready = true;
        visit_nodes(self.root.as_mut(), &mut |node: &mut dyn Node| {
            ready &= node.is_ready_to_process();
        });
        ready
    }

    fn process_sub_range(&mut self, reference_range: SampleRange, offset: usize) {
        self.play_head_state.update(reference_range);
        self.midi.clear();

        let length = reference_range.length() as usize;
        let mut block = self.output.block_of_length(offset + length);
        let mut context = ProcessContext {
            stream_sample_range: reference_range,
            play_head_state: &self.play_head_state,
            buffers: ProcessBuffers {
                audio: block.sub_block(offset, length),
                midi: &mut self.midi,
            },
        };

        self.root.process(&mut context);
    }

    /// Renders `data` in chunks of at most one prepared block.
    fn render_interleaved<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: cpal::FromSample<f32>,
    {
        let channels = channels.max(1);
        let block_size = self.block_size.max(1);

        for chunk in data.chunks_mut(block_size * channels) {
            let num_frames = chunk.len() / channels;
            self.process(num_frames);
            self.fill_interleaved(chunk, channels, num_frames);
        }
    }

    fn fill_interleaved<T>(&self, data: &mut [T], channels: usize, num_frames: usize)
    where
        T: cpal::FromSample<f32>,
    {
        for (frame, samples) in data.chunks_exact_mut(channels).take(num_frames).enumerate() {
            for (channel, sample) in samples.iter_mut().enumerate() {
                let source = channel.min(self.num_channels - 1);
                *sample = self.output.channel(source)[frame].to_sample::<T>();
            }
        }
    }
}

impl AudioSource for NodePlayer {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, channels: usize) {
        match buffer {
            AudioSourceBufferKind::F32(data) => self.render_interleaved(data, channels),
            AudioSourceBufferKind::I16(data) => self.render_interleaved(data, channels),
            AudioSourceBufferKind::U16(data) => self.render_interleaved(data, channels),
        }
    }
}
