//! Configuration loaders used by the behavioural suites.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use recolor_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that points the service at a Unix socket in a private directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    socket_dir: Arc<TempDir>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        Self {
            socket_dir: Arc::new(dir),
        }
    }

    /// Socket path handed out in every loaded configuration.
    pub fn socket_path(&self) -> Utf8PathBuf {
        let path = self.socket_dir.path().join("nested").join("recolord.sock");
        Utf8PathBuf::from_path_buf(path).expect("temporary socket path was not valid UTF-8")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            service_socket: SocketEndpoint::unix(self.socket_path()),
            ..Config::default()
        })
    }
}

/// Loader that fails by passing an unsupported socket scheme on the
/// command line.
#[derive(Clone, Copy)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("recolord"),
            OsString::from("--service-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
