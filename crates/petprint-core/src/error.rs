//! Errors shared by the external collaborators.

use thiserror::Error;

/// A failure reported by the background-removal or generation collaborator.
///
/// Carries the remote payload, when there is one, so callers can log it for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ExternalServiceError {
    /// Human-readable message.
    pub message: String,
    /// Machine payload returned by the remote side, if any.
    pub payload: Option<serde_json::Value>,
    /// HTTP status, if the failure came from a response.
    pub status: Option<u16>,
}

impl ExternalServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
            status: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}
