//! Scenario world for the bootstrap suite.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;

use crate::bootstrap::{BootstrapError, ConfigLoader, Service, bootstrap_with};

use super::{FailingConfigLoader, RecordingHealthReporter, TestConfigLoader};

pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    socket_loader: TestConfigLoader,
    pub reporter: Arc<RecordingHealthReporter>,
    service: Option<Service>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    pub fn new() -> Self {
        let socket_loader = TestConfigLoader::new();
        Self {
            loader: Box::new(socket_loader.clone()),
            socket_loader,
            reporter: Arc::new(RecordingHealthReporter::default()),
            service: None,
            bootstrap_error: None,
        }
    }

    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(self.socket_loader.clone());
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.service.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        match bootstrap_with(&*self.loader, self.reporter.clone()) {
            Ok(service) => self.service = Some(service),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn socket_loader(&self) -> &TestConfigLoader {
        &self.socket_loader
    }

    fn reset_results(&mut self) {
        self.service = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[fixture]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
