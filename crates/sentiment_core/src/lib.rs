//! Sentiment core: pure request state machine, input validation and the canonical result model.
mod effect;
mod error;
mod kind;
mod msg;
mod result;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use error::{AnalysisError, DataIntegrityWarning, ErrorKind};
pub use kind::AnalysisKind;
pub use msg::Msg;
pub use result::{
    sort_word_counts, AnalysisResult, DetailScores, Sentiment, TimelinePoint, WordCount,
    DETAIL_SUM_TOLERANCE,
};
pub use state::{AnalysisRequest, Generation, RequestState, Session};
pub use update::update;
pub use validate::{validate, InvalidInput, NormalizedPayload, MAX_TEXT_CHARS};
pub use view_model::{ErrorView, RequestStatus, SessionViewModel};
