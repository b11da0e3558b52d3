//! External responder boundary.
//!
//! The remote service that turns an utterance into reply text is an opaque
//! collaborator behind [`Responder`]; the HTTP implementation posts the wire
//! payload and treats every non-2xx status or transport failure uniformly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request payload for one chat call.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Success payload: raw reply text, pre-formatting.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Failure of a single chat call. Local to one turn, never fatal.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("responder returned HTTP {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One request/response exchange with the remote responder.
///
/// Implementations block for as long as the remote takes; callers run them on
/// worker threads. `Send + Sync` so one instance serves concurrent turns.
pub trait Responder: Send + Sync {
    fn send(&self, message: &str) -> Result<String, ResponderError>;
}

/// HTTP responder speaking the `{"message"} -> {"response"}` wire format.
pub struct HttpResponder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpResponder {
    /// Build a responder for the given chat endpoint. No request timeout is
    /// set: bounding remote latency is left to the transport layer.
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Responder for HttpResponder {
    fn send(&self, message: &str) -> Result<String, ResponderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Status(status.as_u16()));
        }
        let payload: ChatResponse = response.json()?;
        Ok(payload.response)
    }
}
