use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::{RawResponse, ServiceConfig, TransportError, TransportFailure};

const JSON: &str = "application/json";

/// One HTTP round trip. Retries and classification live above this seam.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|err| TransportError::new(TransportFailure::InvalidRequest, err.to_string()))?;
        Ok(Self {
            client,
            max_bytes: config.max_response_bytes,
        })
    }

    fn too_large(&self, actual: u64) -> TransportError {
        TransportError::new(
            TransportFailure::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| TransportError::new(TransportFailure::InvalidUrl, err.to_string()))?;
        let payload = serde_json::to_vec(body)
            .map_err(|err| TransportError::new(TransportFailure::InvalidRequest, err.to_string()))?;

        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        if let Some(content_len) = response.content_length() {
            if success && content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                if success {
                    return Err(self.too_large(next_len));
                }
                // Error bodies only feed the message; the status still has to reach the classifier.
                let room = usize::try_from(self.max_bytes)
                    .unwrap_or(usize::MAX)
                    .saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..room.min(chunk.len())]);
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            body: bytes,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportFailure::Timeout, err.to_string());
    }
    if err.is_connect() {
        return TransportError::new(TransportFailure::Connect, err.to_string());
    }
    if err.is_redirect() {
        return TransportError::new(TransportFailure::RedirectLimitExceeded, err.to_string());
    }
    if err.is_builder() {
        return TransportError::new(TransportFailure::InvalidRequest, err.to_string());
    }
    TransportError::new(TransportFailure::Network, err.to_string())
}
