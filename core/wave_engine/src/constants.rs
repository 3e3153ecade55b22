/// Tolerance used when comparing rendered samples in tests.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;

/// Declick length after an ordinary discontinuity (seek, stop/start).
pub const DECLICK_FADE_SAMPLES: usize = 10;

/// Declick length while scrubbing or after a failed read.
pub const LONG_DECLICK_FADE_SAMPLES: usize = 40;

/// Gain applied on top of the clip level while the user drags the playhead.
pub const SCRUB_ATTENUATION: f32 = 0.4;

/// Extra file samples read past the mapped range for the interpolator.
pub const RESAMPLER_GUARD_SAMPLES: usize = 2;

/// Read attempts allowed on the real-time path.
pub const REALTIME_READ_RETRIES: u32 = 3;

/// Read attempts allowed while rendering offline, where blocking is acceptable.
pub const OFFLINE_READ_RETRIES: u32 = 5000;

/// Dry levels at or below this are treated as fully wet.
pub const DRY_GAIN_THRESHOLD: f32 = 0.000_04;

/// Wet levels at or above this are treated as unity.
pub const WET_GAIN_THRESHOLD: f32 = 0.999;
