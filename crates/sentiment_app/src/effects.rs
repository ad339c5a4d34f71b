use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use sentiment_core::{AnalysisKind, Effect, Msg};
use sentiment_engine::{EngineEvent, EngineHandle};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(request) => {
                    engine_info!(
                        "Dispatch kind={} generation={} payload_len={}",
                        request.kind(),
                        request.generation(),
                        request.payload().len()
                    );
                    self.engine.dispatch(request);
                }
                Effect::Supersede { kind, generation } => {
                    engine_debug!("Supersede kind={} generation={}", kind, generation);
                    self.engine.supersede(kind, generation);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event, addressed to the session of its kind.
    pub fn next_msg(&self, timeout: Duration) -> Option<(AnalysisKind, Msg)> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }
}

fn event_to_msg(event: EngineEvent) -> (AnalysisKind, Msg) {
    match event {
        EngineEvent::RetryScheduled {
            kind,
            generation,
            attempt,
            delay,
        } => (
            kind,
            Msg::RetryScheduled {
                generation,
                attempt,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            },
        ),
        EngineEvent::Completed {
            kind,
            generation,
            outcome,
        } => (
            kind,
            Msg::ResponseArrived {
                generation,
                outcome,
            },
        ),
    }
}
