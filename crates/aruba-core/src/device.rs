//! Device and report classification.
//!
//! `DeviceKind` comes from the inventory and selects which rule sets exist;
//! `ReportKind` names one CLI report shape and the command that produces it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Family of Aruba equipment a target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// ArubaOS-Switch (ProCurve lineage).
    #[default]
    ArubaSwitch,
    /// Mobility controller.
    ArubaController,
    /// Instant access point cluster.
    ArubaInstant,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::ArubaSwitch => "aruba_switch",
            DeviceKind::ArubaController => "aruba_controller",
            DeviceKind::ArubaInstant => "aruba_instant",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aruba_switch" | "switch" => Ok(DeviceKind::ArubaSwitch),
            "aruba_controller" | "controller" => Ok(DeviceKind::ArubaController),
            "aruba_instant" | "instant" => Ok(DeviceKind::ArubaInstant),
            other => Err(format!("unknown device kind '{}'", other)),
        }
    }
}

/// Shape of a CLI report handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Per physical interface counters (`show interfaces <ports>`).
    PortCounters,
    /// Per VLAN / logical interface traffic (`show interface vlan`).
    VlanTraffic,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::PortCounters, ReportKind::VlanTraffic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::PortCounters => "port_counters",
            ReportKind::VlanTraffic => "vlan_traffic",
        }
    }

    /// CLI command producing this report. `ports` only applies to port counters.
    pub fn command(&self, ports: Option<&str>) -> String {
        match self {
            ReportKind::PortCounters => {
                format!("show interfaces {}", ports.unwrap_or("all"))
            }
            ReportKind::VlanTraffic => "show interface vlan".to_string(),
        }
    }

    /// Human command family name, used in error messages.
    pub fn family(&self) -> &'static str {
        match self {
            ReportKind::PortCounters => "show interfaces",
            ReportKind::VlanTraffic => "show vlans",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "port_counters" | "port-counters" | "interfaces" => Ok(ReportKind::PortCounters),
            "vlan_traffic" | "vlan-traffic" | "vlans" => Ok(ReportKind::VlanTraffic),
            other => Err(format!("unknown report kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_round_trips_through_str() {
        for kind in [
            DeviceKind::ArubaSwitch,
            DeviceKind::ArubaController,
            DeviceKind::ArubaInstant,
        ] {
            assert_eq!(kind.as_str().parse::<DeviceKind>(), Ok(kind));
        }
        assert_eq!("switch".parse::<DeviceKind>(), Ok(DeviceKind::ArubaSwitch));
        assert!("cisco".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_report_commands() {
        assert_eq!(
            ReportKind::PortCounters.command(None),
            "show interfaces all"
        );
        assert_eq!(
            ReportKind::PortCounters.command(Some("1-4")),
            "show interfaces 1-4"
        );
        assert_eq!(ReportKind::VlanTraffic.command(None), "show interface vlan");
    }

    #[test]
    fn test_report_kind_accepts_cli_spelling() {
        assert_eq!(
            "port-counters".parse::<ReportKind>(),
            Ok(ReportKind::PortCounters)
        );
        assert_eq!(
            "vlan-traffic".parse::<ReportKind>(),
            Ok(ReportKind::VlanTraffic)
        );
    }
}
