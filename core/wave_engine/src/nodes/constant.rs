use crate::graph::{Node, NodeId, NodeProperties, PlaybackInitialisationInfo, ProcessContext};

/// Writes the same value to every sample of every channel.
#[derive(Debug)]
pub struct ConstantNode {
    node_id: NodeId,
    value: f32,
    num_channels: usize,
}

impl ConstantNode {
    pub fn new(value: f32, num_channels: usize) -> Self {
        Self {
            node_id: NodeId::new(),
            value,
            num_channels,
        }
    }
}

impl Node for ConstantNode {
    fn node_properties(&self) -> NodeProperties {
        NodeProperties {
            has_audio: true,
            has_midi: false,
            number_of_channels: self.num_channels,
            node_id: self.node_id,
        }
    }

    fn prepare_to_play(&mut self, _info: &PlaybackInitialisationInfo) {}

    fn process(&mut self, context: &mut ProcessContext<'_>) {
        let audio = &mut context.buffers.audio;
        for channel in 0..audio.num_channels().min(self.num_channels) {
            audio.channel_mut(channel).fill(self.value);
        }
    }
}
