//! Lifecycle reporting for the service.
//!
//! The service announces each stage of its life as a [`Lifecycle`] event.
//! The default [`StructuredHealthReporter`] turns those into records on the
//! `recolord::health` target; tests inject a recorder instead.

use std::sync::Arc;

use recolor_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// A stage in the life of the service.
#[derive(Debug, Clone, Copy)]
pub enum Lifecycle<'a> {
    /// Configuration loading is about to begin.
    Starting,
    /// Bootstrap finished with this configuration.
    Configured(&'a Config),
    /// Bootstrap stopped at this error.
    Failed(&'a BootstrapError),
    /// The listener is bound and accepting clients.
    Listening(&'a SocketEndpoint),
    /// The listener has stopped after sending this many replies.
    Stopped {
        /// Replies written to clients over the life of the listener.
        replies_sent: u64,
    },
}

impl Lifecycle<'_> {
    /// Stable name used as the `event` field of health records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Starting => "bootstrap_starting",
            Self::Configured(_) => "bootstrap_succeeded",
            Self::Failed(_) => "bootstrap_failed",
            Self::Listening(_) => "listener_ready",
            Self::Stopped { .. } => "shutdown_completed",
        }
    }
}

/// Observer for [`Lifecycle`] events.
pub trait HealthReporter: Send + Sync {
    /// Called once per lifecycle stage, in order.
    fn report(&self, event: &Lifecycle<'_>);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn report(&self, event: &Lifecycle<'_>) {
        (**self).report(event);
    }
}

/// Reporter that writes lifecycle events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn report(&self, event: &Lifecycle<'_>) {
        let name = event.name();
        match *event {
            Lifecycle::Starting => {
                tracing::info!(target: HEALTH_TARGET, event = name, "loading configuration");
            }
            Lifecycle::Configured(config) => tracing::info!(
                target: HEALTH_TARGET,
                event = name,
                socket = %config.service_socket(),
                log_filter = %config.log_filter(),
                log_format = %config.log_format(),
                "service configured"
            ),
            Lifecycle::Failed(error) => tracing::error!(
                target: HEALTH_TARGET,
                event = name,
                %error,
                "service bootstrap failed"
            ),
            Lifecycle::Listening(endpoint) => tracing::info!(
                target: HEALTH_TARGET,
                event = name,
                socket = %endpoint,
                "accepting recolor requests"
            ),
            Lifecycle::Stopped { replies_sent } => tracing::info!(
                target: HEALTH_TARGET,
                event = name,
                replies_sent,
                "recolor service stopped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Lifecycle::Starting, "bootstrap_starting")]
    #[case(Lifecycle::Stopped { replies_sent: 3 }, "shutdown_completed")]
    fn events_carry_stable_names(#[case] event: Lifecycle<'static>, #[case] expected: &str) {
        assert_eq!(event.name(), expected);
    }

    #[derive(Default)]
    struct NameLog(Mutex<Vec<&'static str>>);

    impl HealthReporter for NameLog {
        fn report(&self, event: &Lifecycle<'_>) {
            self.0.lock().expect("name log lock").push(event.name());
        }
    }

    #[test]
    fn shared_reporters_forward_every_event() {
        let log = Arc::new(NameLog::default());
        let shared = Arc::clone(&log);
        let config = Config::default();

        shared.report(&Lifecycle::Configured(&config));
        shared.report(&Lifecycle::Listening(config.service_socket()));

        assert_eq!(
            *log.0.lock().expect("name log lock"),
            vec!["bootstrap_succeeded", "listener_ready"]
        );
    }
}
