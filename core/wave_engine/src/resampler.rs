/// Variable-ratio 4-point Lagrange interpolator.
///
/// Keeps the last four source samples and the fractional read position
/// between calls, so consecutive blocks join without a seam. Output lags the
/// source by two samples while the interpolator looks ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagrangeResampler {
    /// Oldest first. Interpolation runs between `history[1]` and `history[2]`.
    history: [f32; 4],
    sub_sample_pos: f64,
}

impl Default for LagrangeResampler {
    fn default() -> Self {
        Self {
            history: [0.0; 4],
            sub_sample_pos: 1.0,
        }
    }
}

impl LagrangeResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds `dest.len()` interpolated samples, scaled by `gain`, onto `dest`.
    ///
    /// Steps through `src` at `ratio` source samples per output sample and
    /// returns how many source samples were consumed. Source samples past the
    /// end of `src` read as silence.
    pub fn process_adding(&mut self, ratio: f64, src: &[f32], dest: &mut [f32], gain: f32) -> usize {
        debug_assert!(ratio > 0.0);

        let mut pos = self.sub_sample_pos;
        let mut used = 0;

        for out in dest.iter_mut() {
            while pos >= 1.0 {
                self.push(src.get(used).copied().unwrap_or(0.0));
                used += 1;
                pos -= 1.0;
            }

            *out += gain * self.value_at(pos as f32);
            pos += ratio;
        }

        self.sub_sample_pos = pos;
        used
    }

    fn push(&mut self, sample: f32) {
        self.history.copy_within(1.., 0);
        self.history[3] = sample;
    }

    /// Lagrange polynomial through nodes -1, 0, 1, 2 evaluated at `t` in [0, 1).
    fn value_at(&self, t: f32) -> f32 {
        let [ym1, y0, y1, y2] = self.history;

        let c_m1 = -t * (t - 1.0) * (t - 2.0) / 6.0;
        let c_0 = (t + 1.0) * (t - 1.0) * (t - 2.0) / 2.0;
        let c_1 = -(t + 1.0) * t * (t - 2.0) / 2.0;
        let c_2 = (t + 1.0) * t * (t - 1.0) / 6.0;

        c_m1 * ym1 + c_0 * y0 + c_1 * y1 + c_2 * y2
    }
}

/// Per output channel resampling state that outlives a single block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState {
    pub resampler: LagrangeResampler,
    /// Last sample written to the destination, the start point of the next declick.
    pub last_sample: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUDIO_SAMPLE_EPSILON;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_unity_ratio_reproduces_source_after_latency() {
        let src = ramp(64);
        let mut dest = vec![0.0; 64];
        let mut resampler = LagrangeResampler::new();

        let used = resampler.process_adding(1.0, &src, &mut dest, 1.0);

        assert_eq!(used, 64);
        assert_eq!(&dest[..2], &[0.0, 0.0]);
        for i in 2..64 {
            assert!((dest[i] - src[i - 2]).abs() < AUDIO_SAMPLE_EPSILON, "sample {i}");
        }
    }

    #[test]
    fn test_output_is_added_onto_destination() {
        let src = vec![0.0; 16];
        let mut dest = vec![1.0; 16];
        LagrangeResampler::new().process_adding(1.0, &src, &mut dest, 1.0);

        assert!(dest.iter().all(|s| (*s - 1.0).abs() < AUDIO_SAMPLE_EPSILON));
    }

    #[test]
    fn test_gain_scales_output() {
        let src = vec![0.8; 16];
        let mut dest = vec![0.0; 16];
        LagrangeResampler::new().process_adding(1.0, &src, &mut dest, 0.5);

        assert!((dest[15] - 0.4).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_ratio_two_consumes_twice_the_source() {
        let src = vec![0.0; 400];
        let mut dest = vec![0.0; 64];
        let mut resampler = LagrangeResampler::new();

        // the first output only primes one sample, the remainder carries over
        assert_eq!(resampler.process_adding(2.0, &src, &mut dest, 1.0), 127);
        assert_eq!(resampler.process_adding(2.0, &src, &mut dest, 1.0), 128);
    }

    #[test]
    fn test_half_ratio_interpolates_linear_ramp_exactly() {
        let src = ramp(64);
        let mut dest = vec![0.0; 64];
        LagrangeResampler::new().process_adding(0.5, &src, &mut dest, 1.0);

        for i in 10..64 {
            assert!((dest[i] - dest[i - 1] - 0.5).abs() < 1e-4, "sample {i}");
        }
    }

    #[test]
    fn test_state_carries_across_blocks() {
        let src = ramp(64);

        let mut whole = vec![0.0; 64];
        LagrangeResampler::new().process_adding(1.0, &src, &mut whole, 1.0);

        let mut resampler = LagrangeResampler::new();
        let mut split = vec![0.0; 64];
        let used = resampler.process_adding(1.0, &src[..32], &mut split[..32], 1.0);
        resampler.process_adding(1.0, &src[used..], &mut split[32..], 1.0);

        assert_eq!(whole, split);
    }

    #[test]
    fn test_reading_past_source_end_is_silent() {
        let src = [1.0_f32; 4];
        let mut dest = vec![0.0; 16];
        let used = LagrangeResampler::new().process_adding(1.0, &src, &mut dest, 1.0);

        assert_eq!(used, 16);
        assert!(dest[15].abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut resampler = LagrangeResampler::new();
        let mut dest = vec![0.0; 8];
        resampler.process_adding(0.7, &[1.0; 8], &mut dest, 1.0);

        resampler.reset();
        assert_eq!(resampler, LagrangeResampler::new());
    }
}
