use std::fmt;
use std::time::Duration;

use sentiment_core::{AnalysisError, AnalysisKind, AnalysisResult, Generation};

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    InvalidUrl,
    InvalidRequest,
    Connect,
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::InvalidUrl => write!(f, "invalid url"),
            TransportFailure::InvalidRequest => write!(f, "invalid request"),
            TransportFailure::Connect => write!(f, "connection failed"),
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            TransportFailure::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            TransportFailure::Network => write!(f, "network error"),
        }
    }
}

/// What the engine reports back to whoever owns the sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A transient failure happened; `attempt` will start after `delay`.
    RetryScheduled {
        kind: AnalysisKind,
        generation: Generation,
        attempt: u32,
        delay: Duration,
    },
    Completed {
        kind: AnalysisKind,
        generation: Generation,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
}
