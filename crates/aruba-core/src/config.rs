//! Exporter configuration and device inventory.
//!
//! Loaded from a TOML file or assembled from command-line targets. Per-device
//! credentials fall back to the global ones.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::device::{DeviceKind, ReportKind};

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid target '{0}'")]
    InvalidTarget(String),
    #[error("no devices configured")]
    NoDevices,
    #[error("{0}")]
    Invalid(String),
}

/// Which reports are collected from every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "enabled")]
    pub interfaces: bool,
    #[serde(default = "enabled")]
    pub vlans: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            interfaces: true,
            vlans: true,
        }
    }
}

impl FeatureConfig {
    pub fn reports(&self) -> Vec<ReportKind> {
        let mut reports = Vec::with_capacity(2);
        if self.interfaces {
            reports.push(ReportKind::PortCounters);
        }
        if self.vlans {
            reports.push(ReportKind::VlanTraffic);
        }
        reports
    }
}

/// One polled device.
#[derive(Clone, PartialEq, Deserialize)]
pub struct DeviceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub kind: DeviceKind,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    /// Port list passed to `show interfaces`; `all` when unset.
    #[serde(default)]
    pub ports: Option<String>,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            kind: DeviceKind::default(),
            username: None,
            password: None,
            key_file: None,
            ports: None,
        }
    }

    /// Identity used as the `target` label. IPv6 hosts are bracketed when a
    /// port follows, so the label parses back through `from_target`.
    pub fn target(&self) -> String {
        if self.port == DEFAULT_SSH_PORT {
            self.host.clone()
        } else if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Parses `host` or `host:port`. Bracketed IPv6 (`[::1]:2222`) is accepted.
    pub fn from_target(target: &str) -> Result<Self, ConfigError> {
        let target = target.trim();
        let invalid = || ConfigError::InvalidTarget(target.to_string());
        if target.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = target.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            let mut device = Self::new(host);
            if let Some(port) = tail.strip_prefix(':') {
                device.port = port.parse().map_err(|_| invalid())?;
            } else if !tail.is_empty() {
                return Err(invalid());
            }
            return Ok(device);
        }

        match target.split_once(':') {
            Some((host, port)) if !port.contains(':') => {
                if host.is_empty() {
                    return Err(invalid());
                }
                let mut device = Self::new(host);
                device.port = port.parse().map_err(|_| invalid())?;
                Ok(device)
            }
            _ => Ok(Self::new(target)),
        }
    }
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("kind", &self.kind)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .field("ports", &self.ports)
            .finish()
    }
}

/// Top-level configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Log verbosity (trace, debug, info, warn, error). Default: "info".
    #[serde(default = "default_level")]
    pub level: String,

    /// SSH session timeout in seconds. Default: 5.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Read chunk size for session output, in bytes. Default: 10000.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound on one command's output. Default: 4 MiB.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub key_file: Option<PathBuf>,

    #[serde(default)]
    pub devices: Vec<DeviceConfig>,

    #[serde(default)]
    pub features: FeatureConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: default_level(),
            timeout: default_timeout(),
            batch_size: default_batch_size(),
            max_output_bytes: default_max_output_bytes(),
            username: default_username(),
            password: None,
            key_file: None,
            devices: Vec::new(),
            features: FeatureConfig::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("level", &self.level)
            .field("timeout", &self.timeout)
            .field("batch_size", &self.batch_size)
            .field("max_output_bytes", &self.max_output_bytes)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .field("devices", &self.devices)
            .field("features", &self.features)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Appends devices from a comma-separated target list.
    pub fn add_targets(&mut self, targets: &str) -> Result<(), ConfigError> {
        for target in targets.split(',').filter(|t| !t.trim().is_empty()) {
            self.devices.push(DeviceConfig::from_target(target)?);
        }
        Ok(())
    }

    /// Uses `value` as the global password when none is configured.
    pub fn fill_password(&mut self, value: Option<String>) {
        if self.password.as_deref().is_none_or(str::is_empty)
            && let Some(value) = value.filter(|v| !v.is_empty())
        {
            debug!("loaded password from env");
            self.password = Some(value);
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        if let Some(d) = self.devices.iter().find(|d| d.host.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "device with empty host (port {})",
                d.port
            )));
        }
        if self.timeout == 0 {
            return Err(ConfigError::Invalid("timeout must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be > 0".to_string()));
        }
        if self.max_output_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_output_bytes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Devices with global credentials filled into unset per-device fields.
    pub fn resolved_devices(&self) -> Vec<DeviceConfig> {
        self.devices
            .iter()
            .map(|d| {
                let mut d = d.clone();
                if d.username.is_none() {
                    d.username = Some(self.username.clone());
                }
                if d.password.is_none() {
                    d.password = self.password.clone().filter(|p| !p.is_empty());
                }
                if d.key_file.is_none() {
                    d.key_file = self.key_file.clone();
                }
                d
            })
            .collect()
    }
}

fn enabled() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_batch_size() -> usize {
    10000
}

fn default_max_output_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_username() -> String {
    "aruba_exporter".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::new();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.batch_size, 10000);
        assert_eq!(cfg.username, "aruba_exporter");
        assert_eq!(
            cfg.features.reports(),
            vec![ReportKind::PortCounters, ReportKind::VlanTraffic]
        );
    }

    #[test]
    fn test_from_toml() {
        let cfg = Config::from_toml_str(
            r#"
level = "debug"
timeout = 10
username = "monitor"
key_file = "/etc/aruba/id_ed25519"

[features]
vlans = false

[[devices]]
host = "sw-core-1"

[[devices]]
host = "10.0.0.2"
port = 2222
kind = "aruba_controller"
username = "ro"
ports = "1-24"
"#,
        )
        .unwrap();

        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.timeout, 10);
        assert_eq!(cfg.batch_size, 10000);
        assert_eq!(cfg.features.reports(), vec![ReportKind::PortCounters]);
        assert_eq!(cfg.devices.len(), 2);
        assert_eq!(cfg.devices[0].port, 22);
        assert_eq!(cfg.devices[0].kind, DeviceKind::ArubaSwitch);
        assert_eq!(cfg.devices[1].kind, DeviceKind::ArubaController);
        assert_eq!(cfg.devices[1].target(), "10.0.0.2:2222");
        assert_eq!(cfg.devices[1].ports.as_deref(), Some("1-24"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[devices]]\nhost = \"sw1\"").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.devices[0].host, "sw1");
        cfg.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/aruba.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("timeout = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_targets() {
        let mut cfg = Config::new();
        cfg.add_targets("sw1, sw2:2222,,[fe80::1]:830,[::1]").unwrap();

        let targets: Vec<String> = cfg.devices.iter().map(|d| d.target()).collect();
        assert_eq!(targets, vec!["sw1", "sw2:2222", "[fe80::1]:830", "::1"]);
        assert_eq!(cfg.devices[2].port, 830);

        for target in &targets {
            let back = DeviceConfig::from_target(target).unwrap();
            assert_eq!(back.target(), *target);
        }
    }

    #[test]
    fn test_invalid_targets() {
        for target in ["sw1:ssh", ":22", "[::1", "[::1]x"] {
            assert!(
                DeviceConfig::from_target(target).is_err(),
                "{target:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_fill_password_only_when_unset() {
        let mut cfg = Config::new();
        cfg.fill_password(Some("from-env".to_string()));
        assert_eq!(cfg.password.as_deref(), Some("from-env"));

        cfg.fill_password(Some("other".to_string()));
        assert_eq!(cfg.password.as_deref(), Some("from-env"));

        let mut cfg = Config::new();
        cfg.fill_password(Some(String::new()));
        assert_eq!(cfg.password, None);
    }

    #[test]
    fn test_resolved_devices_inherit_credentials() {
        let mut cfg = Config::new();
        cfg.password = Some("secret".to_string());
        cfg.key_file = Some(PathBuf::from("/keys/id"));
        cfg.add_targets("sw1").unwrap();
        let mut own = DeviceConfig::new("sw2");
        own.username = Some("admin".to_string());
        cfg.devices.push(own);

        let devices = cfg.resolved_devices();
        assert_eq!(devices[0].username.as_deref(), Some("aruba_exporter"));
        assert_eq!(devices[0].password.as_deref(), Some("secret"));
        assert_eq!(devices[0].key_file, Some(PathBuf::from("/keys/id")));
        assert_eq!(devices[1].username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            Config::new().validate(),
            Err(ConfigError::NoDevices)
        ));

        let mut cfg = Config::new();
        cfg.add_targets("sw1").unwrap();
        cfg.timeout = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut cfg = Config::new();
        cfg.password = Some("hunter2".to_string());
        let mut device = DeviceConfig::new("sw1");
        device.password = Some("hunter3".to_string());
        cfg.devices.push(device);

        let out = format!("{:?}", cfg);
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("hunter3"));
        assert!(out.contains("<redacted>"));
    }
}
