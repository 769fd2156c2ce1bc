//! HttpCallExecutor - synchronous POST to a downstream service

use bytes::Bytes;
use contracts::{CallExecutor, HttpConfig, TransportError};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::error::DispatcherError;

/// Executor that POSTs the payload and waits for the status line
///
/// The wait is bounded by the client's request timeout; the response body
/// is not read.
#[derive(Debug, Clone)]
pub struct HttpCallExecutor {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpCallExecutor {
    /// Create a new HttpCallExecutor from the http config section
    pub fn new(config: &HttpConfig) -> Result<Self, DispatcherError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| DispatcherError::executor_creation("http", e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: config.request_timeout_ms,
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn classify(&self, destination: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                destination: destination.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            TransportError::Unreachable {
                destination: destination.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl CallExecutor for HttpCallExecutor {
    #[instrument(
        name = "http_call",
        skip(self, payload),
        fields(bytes = payload.len())
    )]
    async fn call(&self, destination: &str, payload: Bytes) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(destination)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.classify(destination, e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Downstream answered");

        if !status.is_success() {
            return Err(TransportError::Status {
                destination: destination.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }
}
