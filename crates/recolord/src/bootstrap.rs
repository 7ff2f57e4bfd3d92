//! Service bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use recolor_config::{Config, SocketPreparationError};

use crate::dispatch::Dispatcher;
use crate::health::{HealthReporter, Lifecycle};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the service configuration, swappable in tests.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`], layering defaults, the
/// configuration file, `RECOLOR_*` variables and command-line flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved ahead of time.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        #[source]
        source: TelemetryError,
    },
    /// The socket directory could not be created.
    #[error("failed to prepare service socket: {source}")]
    Socket {
        #[source]
        source: SocketPreparationError,
    },
}

/// A bootstrapped service, ready to bind its listener.
pub struct Service {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Service {
    /// Resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatcher that connections are served with.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Telemetry handle, mostly useful in tests.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter that receives lifecycle events.
    #[must_use]
    pub fn reporter(&self) -> &Arc<dyn HealthReporter> {
        &self.reporter
    }
}

/// Bootstraps the service using the supplied collaborators.
///
/// Loads configuration, installs telemetry and creates the parent directory
/// of a Unix socket endpoint. Each outcome is reported to `reporter`.
///
/// # Errors
///
/// Returns the first step that failed as a [`BootstrapError`].
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Service, BootstrapError> {
    reporter.report(&Lifecycle::Starting);
    match prepare(loader) {
        Ok((config, telemetry)) => {
            reporter.report(&Lifecycle::Configured(&config));
            Ok(Service {
                config,
                dispatcher: Dispatcher::new(),
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.report(&Lifecycle::Failed(&error));
            Err(error)
        }
    }
}

fn prepare(loader: &dyn ConfigLoader) -> Result<(Config, TelemetryHandle), BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .service_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;
    Ok((config, telemetry))
}
