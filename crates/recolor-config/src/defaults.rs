use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Host the service binds to when no override is supplied (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// TCP port the service listens on by default.
pub const DEFAULT_TCP_PORT: u16 = 7077;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint used when neither file, environment nor CLI name one.
#[must_use]
pub fn default_service_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_TCP_PORT)
}
