//! Abstraction over the remote command session.
//!
//! The `CommandRunner` trait lets the collector fetch report text from real
//! switches over SSH or from an in-memory mock in tests.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DeviceConfig;

/// Failure to obtain a command's output from a device.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: russh::Error,
    },
    #[error("no password or key file configured for {user}@{host}")]
    NoCredentials { host: String, user: String },
    #[error("failed to load key {}: {source}", .path.display())]
    Key {
        path: PathBuf,
        #[source]
        source: russh::keys::Error,
    },
    #[error("authentication rejected for {user}@{host}")]
    AuthRejected { host: String, user: String },
    #[error("ssh session error: {0}")]
    Session(#[from] russh::Error),
    #[error("session timed out after {0}s")]
    Timeout(u64),
    #[error("output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },
    #[error("no response for '{command}' from {host}")]
    NoResponse { host: String, command: String },
    #[error("{0}")]
    Unreachable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one CLI command on a device and returns its textual output.
///
/// Implementations must be safe to call concurrently for different devices.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, device: &DeviceConfig, command: &str) -> Result<String, TransportError>;
}
