use crate::time::SampleRange;

/// A reference range mapped onto the timeline.
///
/// When the playhead is looping and the range crosses the loop end, the
/// range is split: `timeline_range1` runs up to the loop end and
/// `timeline_range2` continues from the loop start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitTimelineRange {
    pub is_split: bool,
    pub timeline_range1: SampleRange,
    pub timeline_range2: SampleRange,
}

/// Maps the engine's reference (stream) clock onto timeline positions.
///
/// Both clocks tick at the output sample rate. The reference clock only ever
/// moves forward; the timeline position can jump (seek, scrub) or wrap
/// (loop).
#[derive(Debug, Clone, Default)]
pub struct PlayHead {
    playing: bool,
    user_dragging: bool,
    loop_range: Option<SampleRange>,
    /// timeline position = reference position + offset
    reference_offset: i64,
}

impl PlayHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Re-anchors the timeline so that `reference_position` maps to `timeline_position`.
    pub fn set_position(&mut self, timeline_position: i64, reference_position: i64) {
        self.reference_offset = timeline_position - reference_position;
    }

    /// Empty ranges disable looping.
    pub fn set_loop_range(&mut self, range: Option<SampleRange>) {
        self.loop_range = range.filter(|r| !r.is_empty());
    }

    pub fn loop_range(&self) -> Option<SampleRange> {
        self.loop_range
    }

    pub fn is_looping(&self) -> bool {
        self.loop_range.is_some()
    }

    pub fn set_user_dragging(&mut self, dragging: bool) {
        self.user_dragging = dragging;
    }

    pub fn is_user_dragging(&self) -> bool {
        self.user_dragging
    }

    pub fn reference_sample_position_to_timeline_position(&self, reference_position: i64) -> i64 {
        self.wrap_into_loop(reference_position + self.reference_offset)
    }

    pub fn reference_sample_range_to_split_timeline_range(
        &self,
        reference_range: SampleRange,
    ) -> SplitTimelineRange {
        let start = self.reference_sample_position_to_timeline_position(reference_range.start);
        let length = reference_range.length();
        let linear = SampleRange::with_start_and_length(start, length);

        match self.loop_range {
            Some(loop_range) if start < loop_range.end && linear.end > loop_range.end => {
                let range1 = SampleRange::new(start, loop_range.end);
                let remainder = length - range1.length();
                debug_assert!(remainder <= loop_range.length(), "block longer than loop");

                SplitTimelineRange {
                    is_split: true,
                    timeline_range1: range1,
                    timeline_range2: SampleRange::with_start_and_length(loop_range.start, remainder),
                }
            }
            _ => SplitTimelineRange {
                is_split: false,
                timeline_range1: linear,
                timeline_range2: SampleRange::new(linear.end, linear.end),
            },
        }
    }

    fn wrap_into_loop(&self, position: i64) -> i64 {
        match self.loop_range {
            Some(range) if position >= range.start => {
                range.start + (position - range.start).rem_euclid(range.length())
            }
            _ => position,
        }
    }
}

/// Per-block view of the playhead, refreshed once before each (sub-)block.
#[derive(Debug, Clone, Default)]
pub struct PlayHeadState {
    pub play_head: PlayHead,
    previous_timeline_end: Option<i64>,
    contiguous: bool,
    first_block_of_loop: bool,
    last_block_of_loop: bool,
}

impl PlayHeadState {
    pub fn new(play_head: PlayHead) -> Self {
        Self {
            play_head,
            ..Self::default()
        }
    }

    /// Must be called with the reference range that is about to be processed.
    pub fn update(&mut self, reference_range: SampleRange) {
        let split = self
            .play_head
            .reference_sample_range_to_split_timeline_range(reference_range);
        let start = split.timeline_range1.start;

        self.contiguous =
            self.play_head.is_playing() && self.previous_timeline_end == Some(start);

        self.first_block_of_loop = match (self.play_head.loop_range(), self.previous_timeline_end)
        {
            (Some(loop_range), Some(previous_end)) => {
                start == loop_range.start && previous_end == loop_range.end
            }
            _ => false,
        };

        self.last_block_of_loop = split.is_split;

        self.previous_timeline_end = Some(if split.is_split {
            split.timeline_range2.end
        } else {
            split.timeline_range1.end
        });
    }

    /// Forgets the previous block, so the next one is never contiguous.
    pub fn reset(&mut self) {
        self.previous_timeline_end = None;
        self.contiguous = false;
        self.first_block_of_loop = false;
        self.last_block_of_loop = false;
    }

    pub fn is_contiguous_with_previous_block(&self) -> bool {
        self.contiguous
    }

    pub fn is_first_block_of_loop(&self) -> bool {
        self.first_block_of_loop
    }

    pub fn is_last_block_of_loop(&self) -> bool {
        self.last_block_of_loop
    }

    pub fn is_user_dragging(&self) -> bool {
        self.play_head.is_user_dragging()
    }
}
