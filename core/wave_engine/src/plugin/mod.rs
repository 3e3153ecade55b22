use std::fmt;

use crate::{
    buffer::{AudioBlock, AudioBuffer},
    constants::{DRY_GAIN_THRESHOLD, WET_GAIN_THRESHOLD},
};

pub mod saturator;

pub use saturator::Saturator;

/// A self-contained effect with normalised (0..=1) parameters.
pub trait DspAlgorithm: Send + fmt::Debug {
    fn name(&self) -> &str;

    fn prepare(&mut self, _sample_rate: f64) {}

    /// Processes the block in place.
    fn process_block(&mut self, block: &mut AudioBlock<'_>);

    fn parameter_count(&self) -> usize;

    fn parameter(&self, index: usize) -> f32;

    fn set_parameter(&mut self, index: usize, value: f32);

    fn parameter_name(&self, index: usize) -> &str;
}

/// Parameter id derived from its display name: lowercase ASCII letters only.
pub fn parameter_id(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(char::is_ascii_lowercase)
        .collect()
}

/// Runs a [`DspAlgorithm`] with dry/wet mixing around it.
///
/// With the dry level effectively off the algorithm runs straight on the
/// block. Otherwise the unprocessed signal is kept aside and added back,
/// scaled by the dry level, after the wet signal has been scaled.
#[derive(Debug)]
pub struct WetDryPlugin {
    algorithm: Box<dyn DspAlgorithm>,
    parameter_ids: Vec<String>,
    dry_gain: f32,
    wet_gain: f32,
    dry: AudioBuffer,
}

impl WetDryPlugin {
    pub fn new(algorithm: Box<dyn DspAlgorithm>) -> Self {
        let parameter_ids = (0..algorithm.parameter_count())
            .map(|i| parameter_id(algorithm.parameter_name(i)))
            .collect();

        Self {
            algorithm,
            parameter_ids,
            dry_gain: 0.0,
            wet_gain: 1.0,
            dry: AudioBuffer::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.algorithm.name()
    }

    pub fn parameter_ids(&self) -> &[String] {
        &self.parameter_ids
    }

    pub fn parameter(&self, id: &str) -> Option<f32> {
        self.parameter_index(id).map(|i| self.algorithm.parameter(i))
    }

    /// Returns `false` for unknown ids. Values are clamped to 0..=1.
    pub fn set_parameter(&mut self, id: &str, value: f32) -> bool {
        match self.parameter_index(id) {
            Some(index) => {
                self.algorithm.set_parameter(index, value.clamp(0.0, 1.0));
                true
            }
            None => false,
        }
    }

    pub fn dry_gain(&self) -> f32 {
        self.dry_gain
    }

    pub fn set_dry_gain(&mut self, gain: f32) {
        self.dry_gain = gain.clamp(0.0, 1.0);
    }

    pub fn wet_gain(&self) -> f32 {
        self.wet_gain
    }

    pub fn set_wet_gain(&mut self, gain: f32) {
        self.wet_gain = gain.clamp(0.0, 1.0);
    }

    pub fn prepare(&mut self, sample_rate: f64, block_size: usize, num_channels: usize) {
        self.algorithm.prepare(sample_rate);
        self.dry.resize(num_channels, block_size);
    }

    pub fn apply_to_block(&mut self, block: &mut AudioBlock<'_>) {
        let num_channels = block.num_channels();
        let num_samples = block.num_samples();

        if self.dry_gain <= DRY_GAIN_THRESHOLD {
            self.process_wet(block);
            return;
        }

        if self.dry.num_channels() < num_channels || self.dry.num_samples() < num_samples {
            self.dry.resize(num_channels, num_samples);
        }

        for channel in 0..num_channels {
            self.dry.channel_mut(channel)[..num_samples].copy_from_slice(block.channel(channel));
        }

        self.process_wet(block);

        for channel in 0..num_channels {
            let dry = &self.dry.channel(channel)[..num_samples];
            for (out, dry) in block.channel_mut(channel).iter_mut().zip(dry) {
                *out += dry * self.dry_gain;
            }
        }
    }

    fn process_wet(&mut self, block: &mut AudioBlock<'_>) {
        self.algorithm.process_block(block);

        let wet = self.wet_gain;
        for channel in 0..block.num_channels() {
            for sample in block.channel_mut(channel) {
                if sample.is_subnormal() {
                    *sample = 0.0;
                }
                if wet < WET_GAIN_THRESHOLD {
                    *sample *= wet;
                }
            }
        }
    }

    fn parameter_index(&self, id: &str) -> Option<usize> {
        self.parameter_ids.iter().position(|p| p == id)
    }
}
