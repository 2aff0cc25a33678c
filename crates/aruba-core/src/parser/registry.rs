//! Line classification rules per report kind.
//!
//! Each report kind is described by a static table of [`RuleSpec`]s: one
//! boundary rule (starts a record, captures its name) followed by field rules
//! (capture one or two values for named attributes). Tables are compiled and
//! validated once into [`RuleSet`]s shared by every parse call.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::device::{DeviceKind, ReportKind};
use crate::record::Attr;

/// What a matching line contributes to the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Starts a new record; the single capture is its name.
    Boundary,
    /// Sets the listed attributes, one per capture group, in order.
    Field(&'static [Attr]),
}

impl Role {
    fn arity(&self) -> usize {
        match self {
            Role::Boundary => 1,
            Role::Field(attrs) => attrs.len(),
        }
    }
}

/// Declarative rule: a role plus the anchored pattern that triggers it.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub role: Role,
    pub pattern: &'static str,
}

/// Rule table validation failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: &'static str,
        #[source]
        source: Box<regex::Error>,
    },
    #[error("pattern '{0}' must be anchored with ^ and $")]
    Unanchored(&'static str),
    #[error("pattern '{pattern}' has {captures} capture groups, rule expects {arity}")]
    ArityMismatch {
        pattern: &'static str,
        captures: usize,
        arity: usize,
    },
    #[error("field rule '{0}' must target one or two attributes")]
    BadArity(&'static str),
    #[error("{report} rules must have exactly one boundary rule placed first")]
    Boundary { report: ReportKind },
}

#[derive(Debug)]
struct Rule {
    role: Role,
    regex: Regex,
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineMatch<'l> {
    Boundary(&'l str),
    Field(Vec<(Attr, &'l str)>),
}

/// Compiled, validated rules for one report kind.
#[derive(Debug)]
pub struct RuleSet {
    report: ReportKind,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compiles a rule table, checking anchoring, arity and boundary placement.
    pub fn compile(report: ReportKind, specs: &[RuleSpec]) -> Result<Self, RegistryError> {
        let boundaries = specs
            .iter()
            .filter(|s| matches!(s.role, Role::Boundary))
            .count();
        if boundaries != 1 || !matches!(specs.first().map(|s| s.role), Some(Role::Boundary)) {
            return Err(RegistryError::Boundary { report });
        }

        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            if !spec.pattern.starts_with('^') || !spec.pattern.ends_with('$') {
                return Err(RegistryError::Unanchored(spec.pattern));
            }
            let arity = spec.role.arity();
            if !(1..=2).contains(&arity) {
                return Err(RegistryError::BadArity(spec.pattern));
            }
            let regex = Regex::new(spec.pattern).map_err(|e| RegistryError::InvalidPattern {
                pattern: spec.pattern,
                source: Box::new(e),
            })?;
            let captures = regex.captures_len() - 1;
            if captures != arity {
                return Err(RegistryError::ArityMismatch {
                    pattern: spec.pattern,
                    captures,
                    arity,
                });
            }
            rules.push(Rule {
                role: spec.role,
                regex,
            });
        }

        Ok(Self { report, rules })
    }

    pub fn report(&self) -> ReportKind {
        self.report
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule matching `line`, with its captures.
    pub fn classify<'l>(&self, line: &'l str) -> Option<LineMatch<'l>> {
        self.rules.iter().find_map(|rule| {
            let caps = rule.regex.captures(line)?;
            let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            Some(match rule.role {
                Role::Boundary => LineMatch::Boundary(group(1)),
                Role::Field(attrs) => LineMatch::Field(
                    attrs
                        .iter()
                        .enumerate()
                        .map(|(i, attr)| (*attr, group(i + 1)))
                        .collect(),
                ),
            })
        })
    }
}

/// ArubaOS-Switch `show interfaces <port>` layout.
///
/// Counter captures are `\S+`: a non-numeric value still matches the line and
/// surfaces as a coercion warning.
pub const PORT_COUNTER_RULES: &[RuleSpec] = &[
    RuleSpec {
        role: Role::Boundary,
        pattern: r"^\s*Status and Counters - Port Counters for port ([\w/]+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::Description]),
        pattern: r"^\s+Name\s*:(.*)$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::MacAddress]),
        pattern: r"^\s+MAC Address\s*:\s*(\S*)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::LinkStatus]),
        pattern: r"^\s+Link Status\s*:\s*(\S+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::PortEnabled]),
        pattern: r"^\s+Port Enabled\s*:\s*(\S+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::RxBytes, Attr::TxBytes]),
        pattern: r"^\s+Bytes Rx\s*:\s*(\S+)\s+Bytes Tx\s*:\s*(\S+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::RxUnicast, Attr::TxUnicast]),
        pattern: r"^\s+Unicast Rx\s*:\s*(\S+)\s+Unicast Tx\s*:\s*(\S+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::RxBroadcastMulticast, Attr::TxBroadcastMulticast]),
        pattern: r"^\s+Bcast/Mcast Rx\s*:\s*(\S+)\s+Bcast/Mcast Tx\s*:\s*(\S+)\s*$",
    },
    // Drops Tx shares its line with FCS Rx in the Errors block.
    RuleSpec {
        role: Role::Field(&[Attr::TxDrops]),
        pattern: r"^\s+FCS Rx\s*:\s*\S+\s+Drops Tx\s*:\s*(\S+)\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::RxDrops]),
        pattern: r"^\s+Discard Rx\s*:\s*(\S+)(?:\s+Out Queue Len\s*:\s*\S+)?\s*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::RxErrors]),
        pattern: r"^\s+Total Rx Errors\s*:\s*(\S+)(?:\s+Deferred Tx\s*:\s*\S+)?\s*$",
    },
];

/// Per-VLAN traffic report: `vlan10.1 (100)` headers with packet/byte totals.
pub const VLAN_TRAFFIC_RULES: &[RuleSpec] = &[
    RuleSpec {
        role: Role::Boundary,
        pattern: r"^([a-zA-Z0-9/-]+\.[a-zA-Z0-9/-]+) \(:?\d+\).*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::InputBytes]),
        pattern: r"^\s*Total [\d,]+ packets, (\S+) bytes input\b.*$",
    },
    RuleSpec {
        role: Role::Field(&[Attr::OutputBytes]),
        pattern: r"^\s*Total [\d,]+ packets, (\S+) bytes output\b.*$",
    },
];

static SWITCH_PORT_COUNTERS: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::compile(ReportKind::PortCounters, PORT_COUNTER_RULES)
        .expect("built-in port counter rules must compile")
});

static SWITCH_VLAN_TRAFFIC: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::compile(ReportKind::VlanTraffic, VLAN_TRAFFIC_RULES)
        .expect("built-in vlan traffic rules must compile")
});

/// Rule set for a device/report pair, `None` when the pair is not supported.
pub fn rules_for(device: DeviceKind, report: ReportKind) -> Option<&'static RuleSet> {
    match (device, report) {
        (DeviceKind::ArubaSwitch, ReportKind::PortCounters) => Some(&*SWITCH_PORT_COUNTERS),
        (DeviceKind::ArubaSwitch, ReportKind::VlanTraffic) => Some(&*SWITCH_VLAN_TRAFFIC),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> &'static RuleSet {
        rules_for(DeviceKind::ArubaSwitch, ReportKind::PortCounters).unwrap()
    }

    fn vlans() -> &'static RuleSet {
        rules_for(DeviceKind::ArubaSwitch, ReportKind::VlanTraffic).unwrap()
    }

    #[test]
    fn test_builtin_tables_compile() {
        assert_eq!(ports().len(), PORT_COUNTER_RULES.len());
        assert_eq!(vlans().len(), VLAN_TRAFFIC_RULES.len());
        assert_eq!(ports().report(), ReportKind::PortCounters);
    }

    #[test]
    fn test_unsupported_devices_have_no_rules() {
        for report in ReportKind::ALL {
            assert!(rules_for(DeviceKind::ArubaController, report).is_none());
            assert!(rules_for(DeviceKind::ArubaInstant, report).is_none());
        }
    }

    #[test]
    fn test_classify_port_boundary() {
        assert_eq!(
            ports().classify("  Status and Counters - Port Counters for port 1/1"),
            Some(LineMatch::Boundary("1/1"))
        );
        assert_eq!(
            ports().classify(" Status and Counters - Port Counters for port A24 "),
            Some(LineMatch::Boundary("A24"))
        );
    }

    #[test]
    fn test_classify_two_value_field() {
        assert_eq!(
            ports().classify("   Bytes Rx        : 2,854,717,268        Bytes Tx        : 3,215"),
            Some(LineMatch::Field(vec![
                (Attr::RxBytes, "2,854,717,268"),
                (Attr::TxBytes, "3,215"),
            ]))
        );
        assert_eq!(
            ports().classify("   Bcast/Mcast Rx  : 79,013               Bcast/Mcast Tx  : 1,287"),
            Some(LineMatch::Field(vec![
                (Attr::RxBroadcastMulticast, "79,013"),
                (Attr::TxBroadcastMulticast, "1,287"),
            ]))
        );
    }

    #[test]
    fn test_classify_drop_and_error_columns() {
        assert_eq!(
            ports().classify("   FCS Rx          : 0                    Drops Tx        : 17"),
            Some(LineMatch::Field(vec![(Attr::TxDrops, "17")]))
        );
        assert_eq!(
            ports().classify("   Discard Rx      : 4                    Out Queue Len   : 0"),
            Some(LineMatch::Field(vec![(Attr::RxDrops, "4")]))
        );
        assert_eq!(
            ports().classify("   Total Rx Errors : 9                    Deferred Tx     : 0"),
            Some(LineMatch::Field(vec![(Attr::RxErrors, "9")]))
        );
    }

    #[test]
    fn test_classify_ignores_unrelated_lines() {
        for line in [
            "",
            "  Totals (Since boot or last clear) :",
            "   Alignment Rx    : 0                    Collisions Tx   : 0",
            "   Total Rx  (bps) : 14,080,088           Total Tx  (bps) : 15,592,184",
            "Bytes Rx : 1 Bytes Tx : 2",
            "   Bytes Rx        : 1",
        ] {
            assert_eq!(ports().classify(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_classify_vlan_lines() {
        assert_eq!(
            vlans().classify("vlan10.1 (100) is up, line protocol is up"),
            Some(LineMatch::Boundary("vlan10.1"))
        );
        assert_eq!(
            vlans().classify("    Total 5 packets, 500 bytes input"),
            Some(LineMatch::Field(vec![(Attr::InputBytes, "500")]))
        );
        assert_eq!(
            vlans().classify("Total 5 packets, 600 bytes output"),
            Some(LineMatch::Field(vec![(Attr::OutputBytes, "600")]))
        );
        assert_eq!(vlans().classify("vlan10 (100)"), None);
    }

    #[test]
    fn test_compile_rejects_missing_boundary() {
        let specs = [RuleSpec {
            role: Role::Field(&[Attr::RxBytes]),
            pattern: r"^x (\d+)$",
        }];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &specs),
            Err(RegistryError::Boundary { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_boundary_not_first() {
        let specs = [
            RuleSpec {
                role: Role::Field(&[Attr::RxBytes]),
                pattern: r"^x (\d+)$",
            },
            RuleSpec {
                role: Role::Boundary,
                pattern: r"^port (\w+)$",
            },
        ];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &specs),
            Err(RegistryError::Boundary { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_arity_mismatch() {
        let specs = [
            RuleSpec {
                role: Role::Boundary,
                pattern: r"^port (\w+)$",
            },
            RuleSpec {
                role: Role::Field(&[Attr::RxBytes, Attr::TxBytes]),
                pattern: r"^bytes (\d+)$",
            },
        ];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &specs),
            Err(RegistryError::ArityMismatch {
                captures: 1,
                arity: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_compile_rejects_unanchored_and_invalid() {
        let unanchored = [RuleSpec {
            role: Role::Boundary,
            pattern: r"port (\w+)",
        }];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &unanchored),
            Err(RegistryError::Unanchored(_))
        ));

        let invalid = [RuleSpec {
            role: Role::Boundary,
            pattern: r"^port (\w+$",
        }];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &invalid),
            Err(RegistryError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_empty_field_targets() {
        let specs = [
            RuleSpec {
                role: Role::Boundary,
                pattern: r"^port (\w+)$",
            },
            RuleSpec {
                role: Role::Field(&[]),
                pattern: r"^nothing$",
            },
        ];
        assert!(matches!(
            RuleSet::compile(ReportKind::PortCounters, &specs),
            Err(RegistryError::BadArity(_))
        ));
    }
}
