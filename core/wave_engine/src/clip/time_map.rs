use transport::time::sample_to_time;

use crate::clip::ClipPlacement;

/// Converts between timeline positions and positions in the clip's file.
///
/// Needs the file's native sample rate, so it only exists once the file has
/// been probed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapper {
    edit_start: f64,
    offset: f64,
    speed_ratio: f64,
    file_sample_rate: f64,
}

impl TimeMapper {
    pub fn new(placement: &ClipPlacement, file_sample_rate: f64) -> Self {
        debug_assert!(placement.speed_ratio() > 0.0);
        debug_assert!(file_sample_rate > 0.0);

        Self {
            edit_start: placement.edit_range().start,
            offset: placement.offset(),
            speed_ratio: placement.speed_ratio(),
            file_sample_rate,
        }
    }

    pub fn file_sample_rate(&self) -> f64 {
        self.file_sample_rate
    }

    pub fn timeline_sample_to_file_sample(&self, timeline_sample: i64, output_rate: f64) -> i64 {
        self.edit_time_to_file_sample(sample_to_time(timeline_sample, output_rate))
    }

    /// Rounds to the nearest file sample, half up.
    pub fn edit_time_to_file_sample(&self, edit_time: f64) -> i64 {
        let file_time = (edit_time - self.file_zero_edit_time()) * self.speed_ratio;
        (file_time * self.file_sample_rate + 0.5).floor() as i64
    }

    pub fn file_sample_to_edit_time(&self, file_sample: i64) -> f64 {
        file_sample as f64 / (self.speed_ratio * self.file_sample_rate) + self.file_zero_edit_time()
    }

    /// Timeline seconds at which the file's first sample would play.
    fn file_zero_edit_time(&self) -> f64 {
        self.edit_start - self.offset
    }
}
