//! Parsers for switch CLI reports.
//!
//! `parse` walks a report line by line. A boundary line closes the record
//! being accumulated and opens a new one named from the capture; field lines
//! fill attributes of the open record. Lines seen before the first boundary
//! have no record to attach to and are dropped.
//!
//! Parsing is pure: the only shared state is the immutable rule registry, so
//! any number of reports can be parsed concurrently.

pub mod coerce;
pub mod registry;

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::device::{DeviceKind, ReportKind};
use crate::record::{Attr, InterfaceRecord};

pub use coerce::CoercionError;
pub use registry::{LineMatch, RegistryError, Role, RuleSet, RuleSpec, rules_for};

/// Structural parse failure; aborts the single call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("'{}' is not implemented for {}", .report.family(), .device)]
    UnsupportedKind {
        device: DeviceKind,
        report: ReportKind,
    },
}

/// A field line whose value could not be coerced. The attribute was left as is.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWarning {
    /// 1-based line number in the report.
    pub line: usize,
    /// Name of the record the line belonged to.
    pub record: String,
    pub attr: Attr,
    pub error: CoercionError,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} of '{}': {}",
            self.line, self.attr, self.record, self.error
        )
    }
}

/// Best-effort result of one parse call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    /// Records in the order their boundary lines appeared.
    pub records: Vec<InterfaceRecord>,
    pub warnings: Vec<FieldWarning>,
    /// Field lines dropped because no boundary preceded them.
    pub orphan_lines: usize,
}

/// Parses one report produced by a device of kind `device`.
pub fn parse(
    device: DeviceKind,
    report: ReportKind,
    text: &str,
) -> Result<ParsedReport, ParseError> {
    debug!(%device, %report, bytes = text.len(), "parsing report");
    let rules = rules_for(device, report).ok_or(ParseError::UnsupportedKind { device, report })?;
    Ok(parse_with(rules, text))
}

/// Runs the section state machine over `text` with an explicit rule set.
pub fn parse_with(rules: &RuleSet, text: &str) -> ParsedReport {
    let mut out = ParsedReport::default();
    let mut current: Option<InterfaceRecord> = None;

    for (idx, line) in text.lines().enumerate() {
        match rules.classify(line) {
            Some(LineMatch::Boundary(name)) => {
                finalize(current.take(), &mut out.records);
                current = Some(InterfaceRecord::new(name));
            }
            Some(LineMatch::Field(captures)) => {
                let Some(record) = current.as_mut() else {
                    trace!(line = idx + 1, "field line before first boundary dropped");
                    out.orphan_lines += 1;
                    continue;
                };
                for (attr, raw) in captures {
                    if let Err(error) = coerce::apply(record, attr, raw) {
                        warn!(
                            line = idx + 1,
                            record = %record.name,
                            %attr,
                            %error,
                            "field value not coerced"
                        );
                        out.warnings.push(FieldWarning {
                            line: idx + 1,
                            record: record.name.clone(),
                            attr,
                            error,
                        });
                    }
                }
            }
            None => {}
        }
    }
    finalize(current, &mut out.records);

    debug!(
        report = %rules.report(),
        records = out.records.len(),
        warnings = out.warnings.len(),
        orphan_lines = out.orphan_lines,
        "report parsed"
    );
    out
}

/// Moves a finished record into the output unless it never got a name.
fn finalize(record: Option<InterfaceRecord>, out: &mut Vec<InterfaceRecord>) {
    if let Some(record) = record
        && !record.is_empty()
    {
        out.push(record);
    }
}
