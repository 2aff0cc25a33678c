//! Prometheus rendering of scrape results.
//!
//! A fresh [`ScrapeMetrics`] is built for every scrape so series of vanished
//! interfaces never linger. All metrics use the "aruba" namespace.

use std::collections::HashSet;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::{trace, warn};

use crate::collector::DeviceScrape;
use crate::record::{Attr, InterfaceRecord};

const NAMESPACE: &str = "aruba";

/// Counter attributes exported as one gauge family each.
const COUNTER_METRICS: [(Attr, &str, &str); 11] = [
    (Attr::RxBytes, "interface_rx_bytes", "Bytes received on the port."),
    (Attr::TxBytes, "interface_tx_bytes", "Bytes transmitted on the port."),
    (
        Attr::RxUnicast,
        "interface_rx_unicast_packets",
        "Unicast packets received on the port.",
    ),
    (
        Attr::TxUnicast,
        "interface_tx_unicast_packets",
        "Unicast packets transmitted on the port.",
    ),
    (
        Attr::RxBroadcastMulticast,
        "interface_rx_broadcast_multicast_packets",
        "Broadcast and multicast packets received on the port.",
    ),
    (
        Attr::TxBroadcastMulticast,
        "interface_tx_broadcast_multicast_packets",
        "Broadcast and multicast packets transmitted on the port.",
    ),
    (Attr::RxDrops, "interface_rx_drops", "Received packets discarded."),
    (Attr::TxDrops, "interface_tx_drops", "Packets dropped on transmit."),
    (Attr::RxErrors, "interface_rx_errors", "Total receive errors."),
    (Attr::InputBytes, "vlan_input_bytes", "Bytes received on the VLAN interface."),
    (Attr::OutputBytes, "vlan_output_bytes", "Bytes sent on the VLAN interface."),
];

/// Gauge families for one scrape, registered in their own registry.
pub struct ScrapeMetrics {
    registry: Registry,
    /// Device reachable and every enabled report parsed (1=yes, 0=no).
    pub up: GaugeVec,
    pub scrape_duration: GaugeVec,
    pub parse_warnings: GaugeVec,
    /// Records overwritten by a later record of the same name in one report.
    pub duplicate_interfaces: GaugeVec,
    /// Operational link state (1=up, 0=down).
    pub interface_up: GaugeVec,
    /// Administrative state (1=enabled, 0=disabled).
    pub interface_admin_enabled: GaugeVec,
    counters: Vec<(Attr, GaugeVec)>,
}

impl ScrapeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let up = GaugeVec::new(
            Opts::new(
                "up",
                "Whether the device answered and every report parsed (1=yes, 0=no).",
            )
            .namespace(NAMESPACE),
            &["target"],
        )?;
        let scrape_duration = GaugeVec::new(
            Opts::new(
                "scrape_duration_seconds",
                "Time spent collecting the device.",
            )
            .namespace(NAMESPACE),
            &["target"],
        )?;
        let parse_warnings = GaugeVec::new(
            Opts::new(
                "parse_warnings",
                "Fields whose value could not be coerced, by report.",
            )
            .namespace(NAMESPACE),
            &["target", "report"],
        )?;
        let duplicate_interfaces = GaugeVec::new(
            Opts::new(
                "duplicate_interfaces",
                "Records shadowed by a later record of the same name, by report.",
            )
            .namespace(NAMESPACE),
            &["target", "report"],
        )?;
        let interface_up = GaugeVec::new(
            Opts::new("interface_up", "Link status of the port (1=up, 0=down).")
                .namespace(NAMESPACE),
            &["target", "name", "description", "mac"],
        )?;
        let interface_admin_enabled = GaugeVec::new(
            Opts::new(
                "interface_admin_enabled",
                "Whether the port is administratively enabled (1=yes, 0=no).",
            )
            .namespace(NAMESPACE),
            &["target", "name"],
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(scrape_duration.clone()))?;
        registry.register(Box::new(parse_warnings.clone()))?;
        registry.register(Box::new(duplicate_interfaces.clone()))?;
        registry.register(Box::new(interface_up.clone()))?;
        registry.register(Box::new(interface_admin_enabled.clone()))?;

        let mut counters = Vec::with_capacity(COUNTER_METRICS.len());
        for (attr, name, help) in COUNTER_METRICS {
            let gauge = GaugeVec::new(
                Opts::new(name, help).namespace(NAMESPACE),
                &["target", "name"],
            )?;
            registry.register(Box::new(gauge.clone()))?;
            counters.push((attr, gauge));
        }

        Ok(Self {
            registry,
            up,
            scrape_duration,
            parse_warnings,
            duplicate_interfaces,
            interface_up,
            interface_admin_enabled,
            counters,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sets every series derived from one device's scrape.
    pub fn record(&self, scrape: &DeviceScrape) {
        let target = scrape.target.as_str();
        self.up
            .with_label_values(&[target])
            .set(if scrape.up { 1.0 } else { 0.0 });
        self.scrape_duration
            .with_label_values(&[target])
            .set(scrape.duration.as_secs_f64());

        for report in &scrape.reports {
            let kind = report.report.as_str();
            let mut seen = HashSet::with_capacity(report.records.len());
            let mut duplicates = 0usize;
            for record in &report.records {
                if !seen.insert(record.name.as_str()) {
                    duplicates += 1;
                    warn!(
                        device = target,
                        report = kind,
                        interface = %record.name,
                        "duplicate interface section, earlier values replaced"
                    );
                }
                self.record_interface(target, record);
            }
            if report.error.is_none() {
                self.parse_warnings
                    .with_label_values(&[target, kind])
                    .set(report.warnings as f64);
                self.duplicate_interfaces
                    .with_label_values(&[target, kind])
                    .set(duplicates as f64);
            }
        }
    }

    fn record_interface(&self, target: &str, record: &InterfaceRecord) {
        let name = record.name.as_str();
        if let Some(value) = record.link_status.and_then(|s| s.as_gauge()) {
            self.interface_up
                .with_label_values(&[
                    target,
                    name,
                    record.description.as_deref().unwrap_or(""),
                    record.mac_address.as_deref().unwrap_or(""),
                ])
                .set(value);
        }
        if let Some(enabled) = record.port_enabled {
            self.interface_admin_enabled
                .with_label_values(&[target, name])
                .set(if enabled { 1.0 } else { 0.0 });
        }
        for (attr, gauge) in &self.counters {
            if let Some(value) = record.counter(*attr) {
                gauge.with_label_values(&[target, name]).set(value);
            }
        }
        trace!(device = target, interface = name, "interface exported");
    }

    /// Text exposition of everything recorded so far.
    pub fn encode(&self) -> prometheus::Result<String> {
        encode_text(&self.registry)
    }
}

/// Renders a registry in the Prometheus text format.
pub fn encode_text(registry: &Registry) -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
