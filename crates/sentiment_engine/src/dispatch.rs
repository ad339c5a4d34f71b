use std::sync::{mpsc, Arc};

use engine_logging::{engine_debug, engine_info, engine_warn};
use sentiment_core::{AnalysisError, AnalysisRequest, AnalysisResult};

use crate::classify::{classify_response, classify_transport, Verdict};
use crate::{normalize, EngineEvent, ServiceConfig, Transport};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sends analysis requests, retrying transient failures with exponential backoff.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    config: ServiceConfig,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, config: ServiceConfig) -> Self {
        Self { transport, config }
    }

    /// Runs one request to completion. The only suspension points are the HTTP
    /// round trip and the backoff sleep, so dropping the future abandons the request.
    pub async fn dispatch(
        &self,
        request: &AnalysisRequest,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisResult, AnalysisError> {
        let kind = request.kind();
        let generation = request.generation();
        let url = self.config.endpoint_url(kind);
        let mut fields = serde_json::Map::new();
        fields.insert(kind.request_field().to_string(), request.payload().into());
        let body = serde_json::Value::Object(fields);
        let max_attempts = self.config.retry.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            engine_info!(
                "dispatch kind={} generation={} attempt={}/{} url={}",
                kind,
                generation,
                attempt,
                max_attempts,
                url
            );

            let verdict = match self.transport.post_json(&url, &body).await {
                Ok(response) => match classify_response(&response) {
                    None => return normalize(kind, &response.body),
                    Some(verdict) => verdict,
                },
                Err(err) => classify_transport(&err),
            };
            engine_debug!(
                "kind={} generation={} attempt={} classified as {:?}",
                kind,
                generation,
                attempt,
                verdict
            );

            let err = match verdict {
                Verdict::Fatal(err) => {
                    engine_warn!("kind={} generation={} failed: {}", kind, generation, err);
                    return Err(err);
                }
                Verdict::Retryable(err) => err,
            };

            if attempt >= max_attempts {
                engine_warn!(
                    "kind={} generation={} giving up after {} attempts, last error: {}",
                    kind,
                    generation,
                    attempt,
                    err
                );
                return Err(AnalysisError::ServerUnavailable { attempts: attempt });
            }

            let delay = self.config.retry.delay_for(attempt - 1);
            engine_warn!(
                "kind={} generation={} attempt {} failed ({}), retrying in {:?}",
                kind,
                generation,
                attempt,
                err,
                delay
            );
            sink.emit(EngineEvent::RetryScheduled {
                kind,
                generation,
                attempt: attempt + 1,
                delay,
            });
            tokio::time::sleep(delay).await;
        }
    }
}
