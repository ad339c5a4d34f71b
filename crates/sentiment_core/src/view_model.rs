use crate::{
    AnalysisError, AnalysisKind, AnalysisResult, DataIntegrityWarning, ErrorKind, Generation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending {
        attempt: u32,
        retry_delay_ms: Option<u64>,
    },
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: ErrorKind,
    /// User-facing text.
    pub message: String,
    /// Diagnostic text, suitable for logs.
    pub detail: String,
}

impl ErrorView {
    pub fn from_error(err: &AnalysisError, kind: AnalysisKind) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(kind),
            detail: err.to_string(),
        }
    }

    pub fn from_warning(warning: &DataIntegrityWarning) -> Self {
        Self {
            kind: warning.kind(),
            message: warning.to_string(),
            detail: format!("{warning:?}"),
        }
    }
}

/// Snapshot of a session for the display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionViewModel {
    pub kind: AnalysisKind,
    pub input: String,
    pub generation: Generation,
    pub status: RequestStatus,
    pub result: Option<AnalysisResult>,
    pub error: Option<ErrorView>,
    /// Rejected input, tagged [`ErrorKind::InvalidInput`]. Independent of `status`.
    pub validation: Option<ErrorView>,
    /// Non-fatal notices attached to a successful result.
    pub warnings: Vec<ErrorView>,
}
