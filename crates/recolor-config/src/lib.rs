//! Layered configuration shared by the recolor service and its client.
//!
//! Values resolve from built-in defaults, then an optional configuration file
//! (`--config-path`), then `RECOLOR_*` environment variables, and finally
//! command-line flags. Both binaries read the same [`Config`] so the client
//! connects to exactly the endpoint the service binds.

mod defaults;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, default_log_filter,
    default_log_filter_string, default_log_format, default_service_socket,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved configuration for the recolor binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RECOLOR")]
pub struct Config {
    /// Endpoint the service binds to and the client connects to.
    #[ortho_config(default = default_service_socket())]
    pub service_socket: SocketEndpoint,
    /// `tracing` filter expression applied to the subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_socket: default_service_socket(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint shared by the service listener and the client.
    #[must_use]
    pub fn service_socket(&self) -> &SocketEndpoint {
        &self.service_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
