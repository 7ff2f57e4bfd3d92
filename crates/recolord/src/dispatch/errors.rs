//! Reasons an inbound message is dropped without a reply.

use serde_json::Value;
use thiserror::Error;

/// Why a message failed validation.
///
/// None of these reach the peer. The serve loop logs them and keeps waiting.
#[derive(Debug, Error)]
pub enum RejectReason {
    /// The message is not an object or has no `status` field.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope { message: &'static str },

    /// `status` holds something other than `"run"`.
    #[error("unrecognised status {status}")]
    UnrecognizedStatus { status: Value },

    /// A `"run"` message whose `data` is missing or is not a color batch.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl RejectReason {
    pub(crate) fn malformed_envelope(message: &'static str) -> Self {
        Self::MalformedEnvelope { message }
    }

    pub(crate) fn unrecognized_status(status: Value) -> Self {
        Self::UnrecognizedStatus { status }
    }

    pub(crate) fn missing_payload() -> Self {
        Self::MalformedPayload {
            message: String::from("run request has no data field"),
            source: None,
        }
    }

    pub(crate) fn invalid_payload(source: serde_json::Error) -> Self {
        Self::MalformedPayload {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Short label used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::UnrecognizedStatus { .. } => "unrecognized_status",
            Self::MalformedPayload { .. } => "malformed_payload",
        }
    }
}
