use crate::{buffer::AudioBlock, plugin::DspAlgorithm};

const DRIVE: usize = 0;
const OUTPUT: usize = 1;

const PARAMETER_NAMES: [&str; 2] = ["Drive", "Output Level"];

/// Soft clipper: `tanh(x * (1 + 9 * drive)) * output`.
#[derive(Debug, Clone, Copy)]
pub struct Saturator {
    parameters: [f32; 2],
}

impl Default for Saturator {
    fn default() -> Self {
        Self {
            parameters: [0.5, 1.0],
        }
    }
}

impl Saturator {
    pub fn new() -> Self {
        Self::default()
    }

    fn drive_gain(&self) -> f32 {
        9.0f32.mul_add(self.parameters[DRIVE], 1.0)
    }
}

impl DspAlgorithm for Saturator {
    fn name(&self) -> &str {
        "Saturator"
    }

    fn process_block(&mut self, block: &mut AudioBlock<'_>) {
        let drive = self.drive_gain();
        let output = self.parameters[OUTPUT];

        for channel in 0..block.num_channels() {
            for sample in block.channel_mut(channel) {
                *sample = (*sample * drive).tanh() * output;
            }
        }
    }

    fn parameter_count(&self) -> usize {
        PARAMETER_NAMES.len()
    }

    fn parameter(&self, index: usize) -> f32 {
        self.parameters.get(index).copied().unwrap_or_default()
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        if let Some(parameter) = self.parameters.get_mut(index) {
            *parameter = value;
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        PARAMETER_NAMES.get(index).copied().unwrap_or_default()
    }
}
