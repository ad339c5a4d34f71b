//! Sentiment engine: HTTP dispatch, retry, classification and response decoding.
mod classify;
mod config;
mod dispatch;
mod engine;
mod normalize;
mod transport;
mod types;

pub use classify::{classify_response, classify_transport, Verdict, RETRYABLE_STATUS};
pub use config::{ConfigError, RetryPolicy, ServiceConfig, API_URL_ENV, DEFAULT_BASE_URL};
pub use dispatch::{ChannelProgressSink, Dispatcher, ProgressSink};
pub use engine::{EngineError, EngineHandle};
pub use normalize::normalize;
pub use transport::{ReqwestTransport, Transport};
pub use types::{EngineEvent, RawResponse, TransportError, TransportFailure};
