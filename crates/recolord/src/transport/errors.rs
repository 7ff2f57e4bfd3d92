//! Error types for the socket listener and the JSONL channel.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix { endpoint: String },
    #[cfg(unix)]
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("existing unix socket {path} is already in use")]
    UnixInUse { path: String },
    #[cfg(unix)]
    #[error("unix socket path {path} is not a socket")]
    UnixNotSocket { path: String },
    #[cfg(unix)]
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("listener thread panicked")]
    ThreadPanic,
}

/// Errors raised while exchanging messages over a connection.
///
/// [`TransportError::is_recoverable`] separates problems confined to a
/// single inbound line, after which the channel is still usable, from
/// failures of the channel itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Inbound line was not valid JSON.
    #[error("failed to decode request line: {0}")]
    Decode(#[source] serde_json::Error),
    /// Inbound line exceeded the size limit and was discarded.
    #[error("request line exceeds the {max_size} byte limit")]
    RequestTooLarge { max_size: usize },
    /// Reply could not be encoded.
    #[error("failed to encode reply: {0}")]
    Encode(#[source] serde_json::Error),
    /// Reading from or writing to the connection failed.
    #[error("connection IO failed: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Returns `true` when the offending message can be dropped and the
    /// channel can keep receiving.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::RequestTooLarge { .. })
    }
}
