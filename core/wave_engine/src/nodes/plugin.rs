use crate::{
    graph::{Node, NodeId, NodeProperties, PlaybackInitialisationInfo, ProcessContext},
    plugin::WetDryPlugin,
};

/// Renders its input, then runs a plugin over the result.
#[derive(Debug)]
pub struct PluginNode {
    node_id: NodeId,
    input: Box<dyn Node>,
    plugin: WetDryPlugin,
}

impl PluginNode {
    pub fn new(input: Box<dyn Node>, plugin: WetDryPlugin) -> Self {
        Self {
            node_id: NodeId::new(),
            input,
            plugin,
        }
    }

    pub fn plugin_mut(&mut self) -> &mut WetDryPlugin {
        &mut self.plugin
    }
}

impl Node for PluginNode {
    fn node_properties(&self) -> NodeProperties {
        NodeProperties {
            node_id: self.node_id,
            ..self.input.node_properties()
        }
    }

    fn direct_input_nodes(&mut self) -> Vec<&mut dyn Node> {
        vec![self.input.as_mut()]
    }

    fn prepare_to_play(&mut self, info: &PlaybackInitialisationInfo) {
        let num_channels = self.input.node_properties().number_of_channels;
        self.plugin.prepare(info.sample_rate, info.block_size, num_channels);
    }

    fn is_ready_to_process(&mut self) -> bool {
        self.input.is_ready_to_process()
    }

    fn process(&mut self, context: &mut ProcessContext<'_>) {
        self.input.process(context);
        self.plugin.apply_to_block(&mut context.buffers.audio);
    }
}
