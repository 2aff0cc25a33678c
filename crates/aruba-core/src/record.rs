//! Output entity of the parser: one record per port or VLAN section.

use std::fmt;

use serde::Serialize;

/// Operational link state reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Up,
    Down,
    Unknown,
}

impl LinkStatus {
    /// Gauge value; `None` for `Unknown` so nothing misleading gets exported.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            LinkStatus::Up => Some(1.0),
            LinkStatus::Down => Some(0.0),
            LinkStatus::Unknown => None,
        }
    }
}

/// One port or VLAN section extracted from a report.
///
/// Everything except `name` is optional: a counter stays `None` until a line
/// carrying it is seen, so "absent" and "zero" remain distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_status: Option<LinkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_unicast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_unicast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_broadcast_multicast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_broadcast_multicast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_drops: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_drops: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_errors: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_bytes: Option<f64>,
}

impl InterfaceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A record is empty when no boundary line ever named it.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Mutable slot for a counter attribute, `None` for non-counter attributes.
    pub fn counter_mut(&mut self, attr: Attr) -> Option<&mut Option<f64>> {
        let slot = match attr {
            Attr::RxBytes => &mut self.rx_bytes,
            Attr::TxBytes => &mut self.tx_bytes,
            Attr::RxUnicast => &mut self.rx_unicast,
            Attr::TxUnicast => &mut self.tx_unicast,
            Attr::RxBroadcastMulticast => &mut self.rx_broadcast_multicast,
            Attr::TxBroadcastMulticast => &mut self.tx_broadcast_multicast,
            Attr::RxDrops => &mut self.rx_drops,
            Attr::TxDrops => &mut self.tx_drops,
            Attr::RxErrors => &mut self.rx_errors,
            Attr::InputBytes => &mut self.input_bytes,
            Attr::OutputBytes => &mut self.output_bytes,
            Attr::Description | Attr::MacAddress | Attr::LinkStatus | Attr::PortEnabled => {
                return None;
            }
        };
        Some(slot)
    }

    /// Current value of a counter attribute.
    pub fn counter(&self, attr: Attr) -> Option<f64> {
        match attr {
            Attr::RxBytes => self.rx_bytes,
            Attr::TxBytes => self.tx_bytes,
            Attr::RxUnicast => self.rx_unicast,
            Attr::TxUnicast => self.tx_unicast,
            Attr::RxBroadcastMulticast => self.rx_broadcast_multicast,
            Attr::TxBroadcastMulticast => self.tx_broadcast_multicast,
            Attr::RxDrops => self.rx_drops,
            Attr::TxDrops => self.tx_drops,
            Attr::RxErrors => self.rx_errors,
            Attr::InputBytes => self.input_bytes,
            Attr::OutputBytes => self.output_bytes,
            _ => None,
        }
    }
}

/// How the captured text of an attribute is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    LinkStatus,
    Flag,
    Counter,
}

/// Record attribute a field rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Description,
    MacAddress,
    LinkStatus,
    PortEnabled,
    RxBytes,
    TxBytes,
    RxUnicast,
    TxUnicast,
    RxBroadcastMulticast,
    TxBroadcastMulticast,
    RxDrops,
    TxDrops,
    RxErrors,
    InputBytes,
    OutputBytes,
}

impl Attr {
    pub const COUNTERS: [Attr; 11] = [
        Attr::RxBytes,
        Attr::TxBytes,
        Attr::RxUnicast,
        Attr::TxUnicast,
        Attr::RxBroadcastMulticast,
        Attr::TxBroadcastMulticast,
        Attr::RxDrops,
        Attr::TxDrops,
        Attr::RxErrors,
        Attr::InputBytes,
        Attr::OutputBytes,
    ];

    pub fn value_kind(&self) -> ValueKind {
        match self {
            Attr::Description | Attr::MacAddress => ValueKind::Text,
            Attr::LinkStatus => ValueKind::LinkStatus,
            Attr::PortEnabled => ValueKind::Flag,
            _ => ValueKind::Counter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attr::Description => "description",
            Attr::MacAddress => "mac_address",
            Attr::LinkStatus => "link_status",
            Attr::PortEnabled => "port_enabled",
            Attr::RxBytes => "rx_bytes",
            Attr::TxBytes => "tx_bytes",
            Attr::RxUnicast => "rx_unicast",
            Attr::TxUnicast => "tx_unicast",
            Attr::RxBroadcastMulticast => "rx_broadcast_multicast",
            Attr::TxBroadcastMulticast => "tx_broadcast_multicast",
            Attr::RxDrops => "rx_drops",
            Attr::TxDrops => "tx_drops",
            Attr::RxErrors => "rx_errors",
            Attr::InputBytes => "input_bytes",
            Attr::OutputBytes => "output_bytes",
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_only_name() {
        let rec = InterfaceRecord::new("1/1");
        assert_eq!(rec.name, "1/1");
        assert!(!rec.is_empty());
        for attr in Attr::COUNTERS {
            assert_eq!(rec.counter(attr), None, "{attr} should be absent");
        }
        assert_eq!(rec.description, None);
        assert_eq!(rec.link_status, None);
    }

    #[test]
    fn test_default_record_is_empty() {
        assert!(InterfaceRecord::default().is_empty());
    }

    #[test]
    fn test_counter_slots_cover_every_counter() {
        let mut rec = InterfaceRecord::new("A1");
        for (i, attr) in Attr::COUNTERS.iter().enumerate() {
            let slot = rec.counter_mut(*attr).expect("counter slot");
            *slot = Some(i as f64);
        }
        for (i, attr) in Attr::COUNTERS.iter().enumerate() {
            assert_eq!(rec.counter(*attr), Some(i as f64));
        }
        assert!(rec.counter_mut(Attr::Description).is_none());
    }

    #[test]
    fn test_link_status_gauge() {
        assert_eq!(LinkStatus::Up.as_gauge(), Some(1.0));
        assert_eq!(LinkStatus::Down.as_gauge(), Some(0.0));
        assert_eq!(LinkStatus::Unknown.as_gauge(), None);
    }
}
