/// Gain, pan and mute of a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipLevel {
    /// Clip gain in decibels. 0.0 = unity.
    pub gain_db: f32,
    /// Controls left-right placement in stereo field.
    /// -1.0 = Left, 0.0 = Center, 1.0 = Right
    pub pan: f32,
    pub mute: bool,
}

impl Default for ClipLevel {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            pan: 0.0,
            mute: false,
        }
    }
}

impl ClipLevel {
    pub fn new(gain_db: f32, pan: f32) -> Self {
        Self {
            gain_db,
            pan,
            mute: false,
        }
    }

    pub fn gain(&self) -> f32 {
        if self.gain_db <= -100.0 {
            0.0
        } else {
            10.0_f32.powf(self.gain_db / 20.0)
        }
    }

    pub fn gain_including_mute(&self) -> f32 {
        if self.mute { 0.0 } else { self.gain() }
    }

    /// Balance law: the centre keeps both sides at unity, panning only
    /// attenuates the opposite side.
    pub fn left_and_right_gains(&self) -> (f32, f32) {
        let gain = self.gain_including_mute();
        let pan = self.pan.clamp(-1.0, 1.0);

        let pan_l = if pan < 0.0 { 1.0 } else { 1.0 - pan };
        let pan_r = if pan > 0.0 { 1.0 } else { 1.0 + pan };

        (gain * pan_l, gain * pan_r)
    }
}
