use crate::{AnalysisKind, AnalysisRequest, Generation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send this request to the analysis service.
    Dispatch(AnalysisRequest),
    /// Advisory: the request with this generation no longer matters and may be abandoned.
    Supersede {
        kind: AnalysisKind,
        generation: Generation,
    },
}
