//! Scrape orchestration across all configured devices.
//!
//! Each device is fetched and parsed on its own task; a device that fails to
//! answer (or a report that fails to parse) only affects its own results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::collector::traits::CommandRunner;
use crate::config::{Config, DeviceConfig};
use crate::device::{DeviceKind, ReportKind};
use crate::parser;
use crate::record::InterfaceRecord;

/// Outcome of one report on one device.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportScrape {
    pub report: ReportKind,
    pub records: Vec<InterfaceRecord>,
    /// Field-level coercion warnings raised while parsing.
    pub warnings: usize,
    pub error: Option<String>,
}

/// Outcome of one device for one scrape cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceScrape {
    pub target: String,
    pub kind: DeviceKind,
    /// Reachable and every enabled report parsed.
    pub up: bool,
    pub duration: Duration,
    pub reports: Vec<ReportScrape>,
}

impl DeviceScrape {
    /// A device whose scrape never produced results: every enabled report
    /// carries `error`.
    fn failed(
        device: &DeviceConfig,
        reports: &[ReportKind],
        duration: Duration,
        error: String,
    ) -> Self {
        Self {
            target: device.target(),
            kind: device.kind,
            up: false,
            duration,
            reports: reports
                .iter()
                .map(|&report| ReportScrape {
                    report,
                    records: Vec::new(),
                    warnings: 0,
                    error: Some(error.clone()),
                })
                .collect(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.reports.iter().map(|r| r.records.len()).sum()
    }
}

/// Fetches and parses the enabled reports from every device.
pub struct Collector {
    devices: Vec<DeviceConfig>,
    reports: Vec<ReportKind>,
    runner: Arc<dyn CommandRunner>,
}

impl Collector {
    /// Creates a collector for the devices in `config`, credentials resolved.
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            devices: config.resolved_devices(),
            reports: config.features.reports(),
            runner,
        }
    }

    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }

    pub fn reports(&self) -> &[ReportKind] {
        &self.reports
    }

    /// Runs one scrape cycle. Results keep the configured device order.
    pub async fn collect(&self) -> Vec<DeviceScrape> {
        let started = Instant::now();
        let handles: Vec<_> = self
            .devices
            .iter()
            .cloned()
            .map(|device| {
                let runner = self.runner.clone();
                let reports = self.reports.clone();
                let handle = tokio::spawn({
                    let device = device.clone();
                    async move { scrape_device(runner.as_ref(), &device, &reports).await }
                });
                (device, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (device, handle) in handles {
            match handle.await {
                Ok(scrape) => results.push(scrape),
                Err(e) => {
                    error!(device = %device.target(), error = %e, "scrape task failed");
                    results.push(DeviceScrape::failed(
                        &device,
                        &self.reports,
                        started.elapsed(),
                        format!("scrape task failed: {}", e),
                    ));
                }
            }
        }

        info!(
            devices = results.len(),
            up = results.iter().filter(|s| s.up).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scrape complete"
        );
        results
    }
}

/// Fetches and parses every report from one device.
pub async fn scrape_device(
    runner: &dyn CommandRunner,
    device: &DeviceConfig,
    reports: &[ReportKind],
) -> DeviceScrape {
    let started = Instant::now();
    let target = device.target();
    let mut results = Vec::with_capacity(reports.len());

    for &report in reports {
        let command = report.command(device.ports.as_deref());
        let text = match runner.run(device, &command).await {
            Ok(text) => text,
            Err(e) => {
                error!(device = %target, %report, error = %e, "fetching report failed");
                results.push(ReportScrape {
                    report,
                    records: Vec::new(),
                    warnings: 0,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        match parser::parse(device.kind, report, &text) {
            Ok(parsed) => {
                if !parsed.warnings.is_empty() {
                    warn!(
                        device = %target,
                        %report,
                        warnings = parsed.warnings.len(),
                        "report parsed with warnings"
                    );
                }
                debug!(device = %target, %report, records = parsed.records.len(), "report collected");
                results.push(ReportScrape {
                    report,
                    records: parsed.records,
                    warnings: parsed.warnings.len(),
                    error: None,
                });
            }
            Err(e) => {
                warn!(device = %target, %report, error = %e, "report skipped");
                results.push(ReportScrape {
                    report,
                    records: Vec::new(),
                    warnings: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    DeviceScrape {
        up: results.iter().all(|r| r.error.is_none()),
        target,
        kind: device.kind,
        duration: started.elapsed(),
        reports: results,
    }
}
