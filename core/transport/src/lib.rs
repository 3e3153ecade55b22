//! Timeline clock primitives shared by every node in a playback graph.

pub mod playhead;
pub mod time;

pub use playhead::{PlayHead, PlayHeadState, SplitTimelineRange};
pub use time::{SampleRange, TimeRange};
