use crate::{AnalysisKind, InvalidInput};

/// Failures that end a request. `DataIntegrityWarning` is deliberately not here:
/// it rides along with a successful [`crate::AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("network error: {message}")]
    NetworkError { message: String },
    #[error("service unavailable after {attempts} attempts")]
    ServerUnavailable { attempts: u32 },
    #[error("http status {status}: {message}")]
    HttpError { status: u16, message: String },
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

/// Flat discriminant of the error taxonomy, for display-layer branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NetworkError,
    ServerUnavailable,
    HttpError(u16),
    MalformedResponse,
    DataIntegrityWarning,
}

impl AnalysisError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        AnalysisError::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput(_) => ErrorKind::InvalidInput,
            AnalysisError::NetworkError { .. } => ErrorKind::NetworkError,
            AnalysisError::ServerUnavailable { .. } => ErrorKind::ServerUnavailable,
            AnalysisError::HttpError { status, .. } => ErrorKind::HttpError(*status),
            AnalysisError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// Text for the display layer. Exhausted retries get their own wording;
    /// network, HTTP and contract failures share a generic one.
    pub fn user_message(&self, kind: AnalysisKind) -> String {
        match self {
            AnalysisError::InvalidInput(invalid) => invalid.to_string(),
            AnalysisError::ServerUnavailable { .. } => {
                "The analysis service is temporarily unavailable. Please try again later."
                    .to_string()
            }
            AnalysisError::NetworkError { .. }
            | AnalysisError::HttpError { .. }
            | AnalysisError::MalformedResponse { .. } => {
                format!("Failed to analyze {}. Please try again later.", kind.noun())
            }
        }
    }
}

/// Detail proportions that do not sum to 1. Non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("detail proportions sum to {sum:.3}, expected 1 ± {tolerance}")]
pub struct DataIntegrityWarning {
    pub sum: f64,
    pub tolerance: f64,
}

impl DataIntegrityWarning {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::DataIntegrityWarning
    }
}
