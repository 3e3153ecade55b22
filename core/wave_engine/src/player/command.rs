use rtrb::{Consumer, Producer};
use transport::SampleRange;

/// Transport changes sent from the control thread to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Stop,
    /// Moves the playhead to a timeline sample, starting with the next block.
    SetPosition(i64),
    /// Timeline samples; `None` or an empty range stops looping.
    SetLoopRange(Option<SampleRange>),
    SetUserDragging(bool),
}

pub type TransportCommandProducer = Producer<TransportCommand>;
pub type TransportCommandConsumer = Consumer<TransportCommand>;
