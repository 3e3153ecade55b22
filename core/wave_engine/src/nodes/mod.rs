pub mod constant;
pub mod midi_input;
pub mod plugin;
pub mod wave;

pub use midi_input::{MidiInputDevice, MidiInputDeviceNode, MidiQueueDevice};
pub use plugin::PluginNode;
pub use wave::{WaveNode, WaveNodeState};
