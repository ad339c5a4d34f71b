use crate::{AnalysisError, AnalysisResult, Generation};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the input box.
    InputChanged(String),
    /// User pressed Analyze on the current input.
    Submitted,
    /// Engine is backing off before another attempt of `generation`.
    RetryScheduled {
        generation: Generation,
        attempt: u32,
        delay_ms: u64,
    },
    /// Engine finished the request tagged with `generation`.
    ResponseArrived {
        generation: Generation,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
