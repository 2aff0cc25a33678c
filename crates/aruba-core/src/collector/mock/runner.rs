//! In-memory command runner for testing collectors without switches.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::collector::traits::{CommandRunner, TransportError};
use crate::config::DeviceConfig;

/// Serves canned command output keyed by host and command.
///
/// Every call is recorded so tests can assert which commands were issued.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<(String, String), String>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the output `host` returns for `command`.
    pub fn add_response(&mut self, host: &str, command: &str, output: impl Into<String>) {
        self.responses
            .insert((host.to_string(), command.to_string()), output.into());
    }

    /// Makes every command sent to `host` fail.
    pub fn add_failure(&mut self, host: &str, message: impl Into<String>) {
        self.failures.insert(host.to_string(), message.into());
    }

    /// Calls made so far as `(host, command)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, device: &DeviceConfig, command: &str) -> Result<String, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((device.host.clone(), command.to_string()));
        }
        if let Some(message) = self.failures.get(&device.host) {
            return Err(TransportError::Unreachable(message.clone()));
        }
        self.responses
            .get(&(device.host.clone(), command.to_string()))
            .cloned()
            .ok_or_else(|| TransportError::NoResponse {
                host: device.host.clone(),
                command: command.to_string(),
            })
    }
}
