//! Reporter that keeps lifecycle events for assertions.

use std::sync::Mutex;

use recolor_config::SocketEndpoint;

use crate::health::{HealthReporter, Lifecycle};

/// Owned copy of a [`Lifecycle`] event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerReady(SocketEndpoint),
    ShutdownCompleted { replies_sent: u64 },
}

impl From<&Lifecycle<'_>> for HealthEvent {
    fn from(event: &Lifecycle<'_>) -> Self {
        match *event {
            Lifecycle::Starting => Self::BootstrapStarting,
            Lifecycle::Configured(_) => Self::BootstrapSucceeded,
            Lifecycle::Failed(error) => Self::BootstrapFailed(error.to_string()),
            Lifecycle::Listening(endpoint) => Self::ListenerReady(endpoint.clone()),
            Lifecycle::Stopped { replies_sent } => Self::ShutdownCompleted { replies_sent },
        }
    }
}

#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("recorded events lock").clone()
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn report(&self, event: &Lifecycle<'_>) {
        self.events
            .lock()
            .expect("recorded events lock")
            .push(HealthEvent::from(event));
    }
}
