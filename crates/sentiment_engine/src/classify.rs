use sentiment_core::AnalysisError;

use crate::{RawResponse, TransportError, TransportFailure};

/// Status that marks the service as temporarily unavailable.
pub const RETRYABLE_STATUS: u16 = 503;

/// How the dispatcher should react to a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Worth another attempt if the budget allows.
    Retryable(AnalysisError),
    /// Give up now and report this error.
    Fatal(AnalysisError),
}

impl Verdict {
    pub fn error(&self) -> &AnalysisError {
        match self {
            Verdict::Retryable(err) | Verdict::Fatal(err) => err,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Verdict::Retryable(_))
    }
}

/// Classifies a completed exchange. `None` means the status was 2xx.
pub fn classify_response(response: &RawResponse) -> Option<Verdict> {
    if response.is_success() {
        return None;
    }
    let error = AnalysisError::HttpError {
        status: response.status,
        message: error_message(response),
    };
    if response.status == RETRYABLE_STATUS {
        Some(Verdict::Retryable(error))
    } else {
        Some(Verdict::Fatal(error))
    }
}

/// Classifies a failure below HTTP. Connection-level trouble is transient;
/// misconfiguration and oversized bodies are not.
pub fn classify_transport(err: &TransportError) -> Verdict {
    let network = || AnalysisError::NetworkError {
        message: err.to_string(),
    };
    match &err.kind {
        TransportFailure::Connect | TransportFailure::Timeout | TransportFailure::Network => {
            Verdict::Retryable(network())
        }
        TransportFailure::InvalidUrl
        | TransportFailure::InvalidRequest
        | TransportFailure::RedirectLimitExceeded => Verdict::Fatal(network()),
        TransportFailure::TooLarge { max_bytes, .. } => Verdict::Fatal(AnalysisError::malformed(
            format!("response body exceeds {max_bytes} bytes"),
        )),
    }
}

/// Server-provided reason when the body is `{"error": ..}` or `{"detail": ..}`,
/// otherwise the canonical status text.
fn error_message(response: &RawResponse) -> String {
    let from_body = serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|value| {
            ["error", "detail"]
                .into_iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_string))
        })
        .filter(|message| !message.trim().is_empty());

    from_body.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string()
    })
}
