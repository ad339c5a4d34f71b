use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::engine_debug;
use sentiment_core::{AnalysisKind, AnalysisRequest, Generation};
use tokio_util::sync::CancellationToken;

use crate::dispatch::{ChannelProgressSink, Dispatcher};
use crate::{EngineEvent, ReqwestTransport, ServiceConfig, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Transport(#[from] TransportError),
}

enum EngineCommand {
    Dispatch(AnalysisRequest),
    Supersede {
        kind: AnalysisKind,
        generation: Generation,
    },
}

type InFlight = Arc<Mutex<HashMap<(AnalysisKind, Generation), CancellationToken>>>;

/// Runs dispatches on a background tokio runtime and hands back [`EngineEvent`]s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: ServiceConfig) -> Result<Self, EngineError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let dispatcher = Arc::new(Dispatcher::new(transport, config));
        let in_flight: InFlight = Arc::default();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &dispatcher, &in_flight, &event_tx, command);
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn dispatch(&self, request: AnalysisRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Dispatch(request));
    }

    /// Advisory: abandon the request `generation` of `kind` if it is still running.
    pub fn supersede(&self, kind: AnalysisKind, generation: Generation) {
        let _ = self.cmd_tx.send(EngineCommand::Supersede { kind, generation });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    dispatcher: &Arc<Dispatcher>,
    in_flight: &InFlight,
    event_tx: &mpsc::Sender<EngineEvent>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Dispatch(request) => {
            let key = (request.kind(), request.generation());
            let token = CancellationToken::new();
            if let Ok(mut map) = in_flight.lock() {
                map.insert(key, token.clone());
            }

            let dispatcher = dispatcher.clone();
            let in_flight = in_flight.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx.clone());
                let outcome = tokio::select! {
                    _ = token.cancelled() => None,
                    outcome = dispatcher.dispatch(&request, &sink) => Some(outcome),
                };
                if let Ok(mut map) = in_flight.lock() {
                    map.remove(&key);
                }

                match outcome {
                    Some(outcome) => {
                        let _ = event_tx.send(EngineEvent::Completed {
                            kind: key.0,
                            generation: key.1,
                            outcome,
                        });
                    }
                    None => engine_debug!("kind={} generation={} abandoned", key.0, key.1),
                }
            });
        }
        EngineCommand::Supersede { kind, generation } => {
            let token = in_flight
                .lock()
                .ok()
                .and_then(|mut map| map.remove(&(kind, generation)));
            match token {
                Some(token) => token.cancel(),
                None => engine_debug!(
                    "kind={} generation={} superseded after it finished",
                    kind,
                    generation
                ),
            }
        }
    }
}
