//! Supervises service launch sequencing.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::{HealthReporter, Lifecycle, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run the service.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the service with the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap, the listener or signal handling
/// fails.
pub fn run_service() -> Result<(), LaunchError> {
    run_service_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(),
    })
}

/// Runs the service with injected collaborators.
pub(crate) fn run_service_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
    } = plan;

    info!(target: PROCESS_TARGET, "starting service runtime");
    let service = bootstrap_with(&loader, Arc::clone(&reporter))?;
    let listener = SocketListener::bind(service.config().service_socket())?;
    let endpoint = listener.endpoint().clone();
    let dispatcher = service.dispatcher();
    let handler = Arc::new(DispatchConnectionHandler::new(dispatcher.clone()));
    let listener_handle = listener.start(handler)?;
    reporter.report(&Lifecycle::Listening(&endpoint));

    let waited = shutdown.wait();
    listener_handle.shutdown();
    listener_handle.join()?;
    waited?;

    reporter.report(&Lifecycle::Stopped {
        replies_sent: dispatcher.replies_sent(),
    });
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
