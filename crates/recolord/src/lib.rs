//! The recolor service.
//!
//! `recolord` listens on the endpoint configured through [`recolor_config`]
//! (`tcp://0.0.0.0:7077` unless overridden) and answers batches of RGB colors
//! with recolored batches. Every connection gets its own thread, but messages
//! take turns: no two batches are ever recolored at the same time.
//!
//! Messages travel as newline-delimited JSON. A request such as
//! `{"status":"run","data":[{"r":1,"g":2,"b":3}]}` is answered with
//! `"status":"done"` and a `data` list in which every distinct color has been
//! swapped for a random one; see [`recolor_engine`] for the guarantees and
//! [`dispatch`] for the validation rules. Messages that fail validation are
//! dropped without a reply.
//!
//! Startup follows [`bootstrap_with`]: configuration, then telemetry, then
//! socket preparation, with each outcome reported through a
//! [`HealthReporter`] as a [`Lifecycle`] event. [`run_service`] adds the
//! listener and blocks until a termination signal arrives.

mod bootstrap;
pub mod dispatch;
mod health;
mod process;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Service, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, Lifecycle, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_service};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
