use transport::{SampleRange, TimeRange, time::time_range_to_sample_range};

use crate::error::{EngineError, EngineResult};

pub mod declick;
pub mod level;
pub mod time_map;

pub use declick::DeclickFade;
pub use level::ClipLevel;
pub use time_map::TimeMapper;

/// Where a recorded file sits on the timeline and how it is played back.
///
/// Fixed for the lifetime of the node that renders it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlacement {
    /// Timeline seconds covered by the clip.
    edit_range: TimeRange,
    /// Seconds into the file that line up with `edit_range.start`.
    offset: f64,
    /// Optional loop section, in file seconds before speed scaling.
    loop_range: Option<TimeRange>,
    /// Playback speed; 1.0 plays the file at its native rate.
    speed_ratio: f64,
}

impl ClipPlacement {
    pub fn new(
        edit_range: TimeRange,
        offset: f64,
        loop_range: Option<TimeRange>,
        speed_ratio: f64,
    ) -> EngineResult<Self> {
        if !(speed_ratio > 0.0 && speed_ratio.is_finite()) {
            return Err(EngineError::InvalidPlacement(format!(
                "speed ratio must be positive, got {speed_ratio}"
            )));
        }

        if edit_range.end < edit_range.start {
            return Err(EngineError::InvalidPlacement(format!(
                "edit range ends before it starts ({} < {})",
                edit_range.end, edit_range.start
            )));
        }

        Ok(Self {
            edit_range,
            offset,
            loop_range: loop_range.filter(|r| !r.is_empty()),
            speed_ratio,
        })
    }

    /// Clip covering `[start, end)` on the timeline at normal speed, no offset, no loop.
    pub fn simple(start: f64, end: f64) -> EngineResult<Self> {
        Self::new(TimeRange::new(start, end), 0.0, None, 1.0)
    }

    pub fn edit_range(&self) -> TimeRange {
        self.edit_range
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    pub fn loop_range(&self) -> Option<TimeRange> {
        self.loop_range
    }

    /// The loop section in speed-scaled file seconds.
    pub fn scaled_loop_range(&self) -> Option<TimeRange> {
        self.loop_range.map(|r| {
            TimeRange::new(r.start * self.speed_ratio, r.end * self.speed_ratio)
        })
    }

    pub fn edit_range_in_samples(&self, sample_rate: f64) -> SampleRange {
        time_range_to_sample_range(self.edit_range, sample_rate)
    }

    /// Whether any part of the timeline section `[start, end)` seconds overlaps the clip.
    pub fn overlaps(&self, section: TimeRange) -> bool {
        section.end > self.edit_range.start && section.start < self.edit_range.end
    }
}
