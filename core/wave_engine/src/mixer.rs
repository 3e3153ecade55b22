use crate::{
    buffer::{AudioBuffer, MidiBuffer},
    graph::{Node, NodeId, NodeProperties, PlaybackInitialisationInfo, ProcessBuffers, ProcessContext},
};

/// Sums several clip nodes into one track buffer.
///
/// Each clip renders into a cleared scratch block that is then added onto
/// the track output, so one clip clearing samples outside its own range
/// never erases another clip's audio.
#[derive(Debug)]
pub struct TrackMixer {
    node_id: NodeId,
    clips: Vec<Box<dyn Node>>,
    num_channels: usize,
    scratch: AudioBuffer,
    midi: MidiBuffer,
}

impl TrackMixer {
    pub fn new(num_channels: usize) -> Self {
        Self {
            node_id: NodeId::new(),
            clips: Vec::new(),
            num_channels,
            scratch: AudioBuffer::default(),
            midi: MidiBuffer::default(),
        }
    }

    pub fn add_clip(&mut self, clip: Box<dyn Node>) {
        self.clips.push(clip);
    }

    pub fn num_clips(&self) -> usize {
        self.clips.len()
    }
}

impl Node for TrackMixer {
    fn node_properties(&self) -> NodeProperties {
        NodeProperties {
            has_audio: true,
            has_midi: false,
            number_of_channels: self.num_channels,
            node_id: self.node_id,
        }
    }

    fn direct_input_nodes(&mut self) -> Vec<&mut dyn Node> {
        self.clips.iter_mut().map(|clip| clip.as_mut() as &mut dyn Node).collect()
    }

    fn prepare_to_play(&mut self, info: &PlaybackInitialisationInfo) {
        self.scratch.resize(self.num_channels, info.block_size);
    }

    fn is_ready_to_process(&mut self) -> bool {
        self.clips.iter_mut().all(|clip| clip.is_ready_to_process())
    }

    fn process(&mut self, context: &mut ProcessContext<'_>) {
        let num_samples = context.num_samples();
        if self.scratch.num_samples() < num_samples {
            self.scratch.resize(self.num_channels, num_samples);
        }

        context.buffers.audio.clear();

        for clip in &mut self.clips {
            let clip_channels = clip.node_properties().number_of_channels.min(self.num_channels);

            self.scratch.clear();
            self.midi.clear();
            {
                let mut block = self.scratch.block_of_length(num_samples);
                let mut clip_context = ProcessContext {
                    stream_sample_range: context.stream_sample_range,
                    play_head_state: context.play_head_state,
                    buffers: ProcessBuffers {
                        audio: block.subset_channels(0, clip_channels),
                        midi: &mut self.midi,
                    },
                };
                clip.process(&mut clip_context);
            }

            context.buffers.audio.add_from(&self.scratch);
        }
    }
}
