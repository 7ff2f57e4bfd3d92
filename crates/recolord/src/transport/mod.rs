//! Socket transport for the service endpoint.
//!
//! The listener binds the configured endpoint and serves every accepted
//! connection on its own thread. Each connection carries newline-delimited
//! JSON messages in both directions.

mod errors;
mod framing;
mod listener;
mod stream;
#[cfg(test)]
mod test_utils;

pub use self::errors::{ListenerError, TransportError};
pub use self::framing::{JsonLineTransport, MAX_MESSAGE_BYTES, Transport};
pub(crate) use self::listener::{ListenerHandle, SocketListener};
pub(crate) use self::stream::{ConnectionHandler, ConnectionStream};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, DrainingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
