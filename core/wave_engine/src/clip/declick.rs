use transport::PlayHeadState;

use crate::constants::{DECLICK_FADE_SAMPLES, LONG_DECLICK_FADE_SAMPLES};

/// A linear crossfade from the last sample a channel emitted into freshly
/// rendered audio, used to hide discontinuities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclickFade {
    pub length_samples: usize,
}

impl DeclickFade {
    pub const fn none() -> Self {
        Self { length_samples: 0 }
    }

    /// Fade for a block whose source read succeeded.
    ///
    /// Contiguous blocks and the first block after a loop wrap are left alone.
    pub fn after_read(play_head_state: &PlayHeadState, num_samples: usize) -> Self {
        if play_head_state.is_contiguous_with_previous_block()
            || play_head_state.is_first_block_of_loop()
        {
            return Self::none();
        }

        let length = if play_head_state.is_user_dragging() {
            LONG_DECLICK_FADE_SAMPLES
        } else {
            DECLICK_FADE_SAMPLES
        };

        Self {
            length_samples: num_samples.min(length),
        }
    }

    /// Fade for a block whose source read failed and was replaced by silence.
    pub fn after_failed_read(num_samples: usize) -> Self {
        Self {
            length_samples: num_samples.min(LONG_DECLICK_FADE_SAMPLES),
        }
    }

    pub fn is_active(&self) -> bool {
        self.length_samples > 0
    }

    /// `dest[i] = i/K * dest[i] + (1 - i/K) * last_sample` over the first K samples.
    pub fn apply(&self, dest: &mut [f32], last_sample: f32) {
        let length = self.length_samples.min(dest.len());
        if length == 0 {
            return;
        }

        for (i, sample) in dest[..length].iter_mut().enumerate() {
            let alpha = i as f32 / self.length_samples as f32;
            *sample = alpha * *sample + last_sample * (1.0 - alpha);
        }
    }
}
