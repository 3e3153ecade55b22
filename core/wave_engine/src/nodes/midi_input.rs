use std::{fmt, time::Instant};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    buffer::{AudioBuffer, MidiBuffer, MidiMessage},
    graph::{Node, NodeProperties, PlaybackInitialisationInfo, ProcessBuffers, ProcessContext},
};

/// Receiver for MIDI played into a track.
pub trait MidiInputDevice: Send + fmt::Debug {
    /// Whether the track's input is also passed through to its output.
    fn is_end_to_end_enabled(&self) -> bool;

    /// `message.timestamp` is absolute, in seconds on the node's wall clock.
    fn handle_incoming_midi_message(&mut self, message: MidiMessage);
}

/// A [`MidiInputDevice`] that queues messages for another thread without locking.
pub struct MidiQueueDevice {
    producer: Producer<MidiMessage>,
    end_to_end: bool,
    dropped: usize,
}

impl MidiQueueDevice {
    pub fn new(capacity: usize, end_to_end: bool) -> (Self, Consumer<MidiMessage>) {
        let (producer, consumer) = RingBuffer::new(capacity);
        (
            Self {
                producer,
                end_to_end,
                dropped: 0,
            },
            consumer,
        )
    }

    /// Messages lost because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl fmt::Debug for MidiQueueDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiQueueDevice")
            .field("end_to_end", &self.end_to_end)
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

impl MidiInputDevice for MidiQueueDevice {
    fn is_end_to_end_enabled(&self) -> bool {
        self.end_to_end
    }

    fn handle_incoming_midi_message(&mut self, message: MidiMessage) {
        if self.producer.push(message).is_err() {
            self.dropped += 1;
        }
    }
}

/// Passes a track's input through and hands its MIDI to an input device.
///
/// Audio and MIDI only reach the output when the device has end-to-end
/// enabled. Every MIDI message from the input is forwarded to the device,
/// stamped with the wall clock plus its offset within the block.
#[derive(Debug)]
pub struct MidiInputDeviceNode {
    input: Box<dyn Node>,
    device: Box<dyn MidiInputDevice>,
    copy_inputs_to_outputs: bool,
    started: Instant,
    audio: AudioBuffer,
    midi: MidiBuffer,
}

impl MidiInputDeviceNode {
    pub fn new(device: Box<dyn MidiInputDevice>, input: Box<dyn Node>) -> Self {
        Self {
            copy_inputs_to_outputs: device.is_end_to_end_enabled(),
            input,
            device,
            started: Instant::now(),
            audio: AudioBuffer::default(),
            midi: MidiBuffer::default(),
        }
    }
}

impl Node for MidiInputDeviceNode {
    fn node_properties(&self) -> NodeProperties {
        self.input.node_properties()
    }

    fn direct_input_nodes(&mut self) -> Vec<&mut dyn Node> {
        vec![self.input.as_mut()]
    }

    fn prepare_to_play(&mut self, info: &PlaybackInitialisationInfo) {
        let num_channels = self.input.node_properties().number_of_channels;
        self.audio.resize(num_channels, info.block_size);
        self.midi = MidiBuffer::with_capacity(256);
    }

    fn is_ready_to_process(&mut self) -> bool {
        self.input.is_ready_to_process()
    }

    fn process(&mut self, context: &mut ProcessContext<'_>) {
        let num_samples = context.num_samples();
        if self.audio.num_samples() < num_samples {
            let num_channels = self.input.node_properties().number_of_channels;
            self.audio.resize(num_channels, num_samples);
        }

        self.audio.clear();
        self.midi.clear();
        {
            let mut input_context = ProcessContext {
                stream_sample_range: context.stream_sample_range,
                play_head_state: context.play_head_state,
                buffers: ProcessBuffers {
                    audio: self.audio.block_of_length(num_samples),
                    midi: &mut self.midi,
                },
            };
            self.input.process(&mut input_context);
        }

        if self.copy_inputs_to_outputs {
            context.buffers.audio.copy_from(&self.audio);
            context.buffers.midi.copy_from(&self.midi);
        }

        let now = self.started.elapsed().as_secs_f64();
        for message in &self.midi {
            self.device
                .handle_incoming_midi_message(message.with_timestamp(now + message.timestamp));
        }
    }
}
