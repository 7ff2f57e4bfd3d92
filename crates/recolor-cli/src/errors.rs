//! Error types for the client runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to read batch from {origin}: {source}")]
    ReadInput { origin: String, source: io::Error },
    #[error("failed to parse batch: {0}")]
    ParseBatch(serde_json::Error),
    #[error("failed to resolve service address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to service at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to service: {0}")]
    SendRequest(io::Error),
    #[error("failed to read reply from service: {0}")]
    ReadReply(io::Error),
    #[error("no reply from service within {timeout_ms} ms")]
    NoReply { timeout_ms: u64 },
    #[error("service closed the connection without replying")]
    ConnectionClosed,
    #[error("failed to parse service reply: {0}")]
    ParseReply(serde_json::Error),
    #[error("service replied with unexpected status {0:?}")]
    UnexpectedStatus(String),
    #[error("failed to write recolored batch: {0}")]
    WriteOutput(io::Error),
}
