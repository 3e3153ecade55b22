use std::fmt;

use transport::{PlayHeadState, SampleRange};

use crate::buffer::{AudioBlock, MidiBuffer};

pub mod node_id;

pub use node_id::NodeId;

/// What a node produces, queried before any buffers are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeProperties {
    pub has_audio: bool,
    pub has_midi: bool,
    pub number_of_channels: usize,
    pub node_id: NodeId,
}

/// Settings the graph is prepared with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackInitialisationInfo {
    pub sample_rate: f64,
    pub block_size: usize,
}

#[derive(Debug)]
pub struct ProcessBuffers<'a> {
    pub audio: AudioBlock<'a>,
    pub midi: &'a mut MidiBuffer,
}

/// Everything a node needs to render one block.
#[derive(Debug)]
pub struct ProcessContext<'a> {
    /// Samples on the reference clock covered by this call.
    ///
    /// Never split by a loop boundary: the player splits such blocks into
    /// contiguous sub-calls before they reach a node.
    pub stream_sample_range: SampleRange,
    pub play_head_state: &'a PlayHeadState,
    pub buffers: ProcessBuffers<'a>,
}

impl ProcessContext<'_> {
    pub fn num_samples(&self) -> usize {
        self.buffers.audio.num_samples()
    }
}

/// A schedulable unit of a playback graph.
///
/// Nodes:
/// - are prepared once before playback with the engine rate and block size
/// - are polled with `is_ready_to_process` before every block
/// - must never block unboundedly inside `process`
pub trait Node: Send + fmt::Debug {
    /// Called before `prepare_to_play` to size buffers.
    fn node_properties(&self) -> NodeProperties;

    /// Upstream nodes that must be processed before this one.
    fn direct_input_nodes(&mut self) -> Vec<&mut dyn Node> {
        Vec::new()
    }

    fn prepare_to_play(&mut self, info: &PlaybackInitialisationInfo);

    /// Non-blocking; may be called repeatedly. Returning `false` defers the node.
    fn is_ready_to_process(&mut self) -> bool {
        true
    }

    fn process(&mut self, context: &mut ProcessContext<'_>);
}

/// Visits `node` and every node upstream of it, inputs first.
pub fn visit_nodes(node: &mut dyn Node, visitor: &mut dyn FnMut(&mut dyn Node)) {
    for input in node.direct_input_nodes() {
        visit_nodes(input, visitor);
    }

    visitor(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::constant::ConstantNode;

    #[derive(Debug)]
    struct Chain {
        id: NodeId,
        inputs: Vec<Box<dyn Node>>,
    }

    impl Node for Chain {
        fn node_properties(&self) -> NodeProperties {
            NodeProperties {
                has_audio: true,
                has_midi: false,
                number_of_channels: 1,
                node_id: self.id,
            }
        }

        fn direct_input_nodes(&mut self) -> Vec<&mut dyn Node> {
            self.inputs.iter_mut().map(|n| n.as_mut() as &mut dyn Node).collect()
        }

        fn prepare_to_play(&mut self, _info: &PlaybackInitialisationInfo) {}

        fn process(&mut self, _context: &mut ProcessContext<'_>) {}
    }

    #[test]
    fn test_visit_nodes_reaches_inputs_before_owner() {
        let first = ConstantNode::new(0.1, 1);
        let second = ConstantNode::new(0.2, 1);
        let ids = [
            first.node_properties().node_id,
            second.node_properties().node_id,
        ];

        let mut chain = Chain {
            id: NodeId::new(),
            inputs: vec![Box::new(first), Box::new(second)],
        };
        let chain_id = chain.id;

        let mut visited = Vec::new();
        visit_nodes(&mut chain, &mut |node: &mut dyn Node| {
            visited.push(node.node_properties().node_id);
        });

        assert_eq!(visited, vec![ids[0], ids[1], chain_id]);
    }
}
