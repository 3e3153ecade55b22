/// Half-open range of sample positions `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SampleRange {
    pub start: i64,
    pub end: i64,
}

impl SampleRange {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub const fn with_start_and_length(start: i64, length: i64) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    pub const fn length(&self) -> i64 {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub const fn contains(&self, position: i64) -> bool {
        position >= self.start && position < self.end
    }
}

/// Half-open range of seconds `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Seconds to the nearest sample (round half up).
pub fn time_to_sample(seconds: f64, sample_rate: f64) -> i64 {
    (seconds * sample_rate + 0.5).floor() as i64
}

pub fn sample_to_time(sample: i64, sample_rate: f64) -> f64 {
    sample as f64 / sample_rate
}

pub fn time_range_to_sample_range(range: TimeRange, sample_rate: f64) -> SampleRange {
    SampleRange::new(
        time_to_sample(range.start, sample_rate),
        time_to_sample(range.end, sample_rate),
    )
}

pub fn sample_range_to_time_range(range: SampleRange, sample_rate: f64) -> TimeRange {
    TimeRange::new(
        sample_to_time(range.start, sample_rate),
        sample_to_time(range.end, sample_rate),
    )
}
