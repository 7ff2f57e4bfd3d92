//! The per-connection serve loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::transport::{
    ConnectionHandler, ConnectionStream, JsonLineTransport, Transport, TransportError,
};

use super::DISPATCH_TARGET;
use super::request::validate;

/// Runs the receive, validate, recolor, reply cycle over a [`Transport`].
///
/// Clones share one turn lock, so however many connections are served at
/// once, messages are processed strictly one after another. Clones also
/// share the reply count. Nothing else is kept between messages; every
/// batch is recolored from scratch.
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    turn: Arc<Mutex<()>>,
    replies: Arc<AtomicU64>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies written so far by this dispatcher and its clones.
    #[must_use]
    pub fn replies_sent(&self) -> u64 {
        self.replies.load(Ordering::Relaxed)
    }

    /// Serves `transport` until the peer closes it.
    ///
    /// Each received message produces exactly one reply or none at all.
    /// Rejected and undecodable messages are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] that leaves the channel unusable.
    pub fn serve<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<(), TransportError> {
        loop {
            let message = match transport.receive() {
                Ok(Some(message)) => message,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, "peer closed the channel");
                    return Ok(());
                }
                Err(error) if error.is_recoverable() => {
                    warn!(target: DISPATCH_TARGET, %error, "dropping unreadable message");
                    continue;
                }
                Err(error) => return Err(error),
            };

            if let Some(reply) = self.process(message) {
                transport.send(&reply)?;
                self.replies.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Validates and recolors one message while holding the turn lock.
    fn process(&self, message: Value) -> Option<Value> {
        let _turn = self.turn.lock().unwrap_or_else(PoisonError::into_inner);
        match validate(message) {
            Ok(request) => {
                let colors = request.batch().len();
                let reply = request.into_reply();
                debug!(target: DISPATCH_TARGET, colors, "batch recolored");
                Some(reply)
            }
            Err(reason) => {
                warn!(
                    target: DISPATCH_TARGET,
                    kind = reason.kind(),
                    %reason,
                    "dropping message"
                );
                None
            }
        }
    }
}

/// Connection handler that speaks JSONL over accepted sockets.
#[derive(Debug, Default)]
pub(crate) struct DispatchConnectionHandler {
    dispatcher: Dispatcher,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        let mut transport = JsonLineTransport::new(stream);
        if let Err(error) = self.dispatcher.serve(&mut transport) {
            warn!(target: DISPATCH_TARGET, %error, "connection closed after transport failure");
        }
    }
}
