//! Conversion of captured text fragments into typed record attributes.
//!
//! Every setter is fallible but a failure only concerns the one attribute:
//! the caller records a warning and keeps accumulating the record.

use thiserror::Error;

use crate::record::{Attr, InterfaceRecord, LinkStatus, ValueKind};

/// A captured value that could not be converted to its attribute's type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("'{0}' is not a counter value")]
    NotACounter(String),
    #[error("'{0}' is not a Yes/No flag")]
    NotAFlag(String),
}

/// Parses a device counter such as `2,854,717,268`.
///
/// Thousands separators are accepted between digit groups. Whole numbers are
/// exact up to 2^53. Values that do not fit a `u64` are rejected.
pub fn parse_counter(raw: &str) -> Result<f64, CoercionError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with(',') || raw.ends_with(',') {
        return Err(CoercionError::NotACounter(raw.to_string()));
    }
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoercionError::NotACounter(raw.to_string()));
    }
    digits
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|_| CoercionError::NotACounter(raw.to_string()))
}

/// Maps `Up`/`Down`; any other token is `Unknown`.
pub fn parse_link_status(raw: &str) -> LinkStatus {
    match raw.trim() {
        "Up" => LinkStatus::Up,
        "Down" => LinkStatus::Down,
        _ => LinkStatus::Unknown,
    }
}

/// Maps `Yes`/`No`.
pub fn parse_flag(raw: &str) -> Result<bool, CoercionError> {
    match raw.trim() {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => Err(CoercionError::NotAFlag(other.to_string())),
    }
}

/// Sets `attr` on `record` from captured text. Last write wins.
///
/// On error the attribute keeps its previous value.
pub fn apply(record: &mut InterfaceRecord, attr: Attr, raw: &str) -> Result<(), CoercionError> {
    match attr.value_kind() {
        ValueKind::Text => {
            let text = raw.trim();
            if text.is_empty() {
                return Ok(());
            }
            let value = Some(text.to_string());
            match attr {
                Attr::Description => record.description = value,
                Attr::MacAddress => record.mac_address = value,
                _ => {}
            }
        }
        ValueKind::LinkStatus => record.link_status = Some(parse_link_status(raw)),
        ValueKind::Flag => record.port_enabled = Some(parse_flag(raw)?),
        ValueKind::Counter => {
            let value = parse_counter(raw)?;
            if let Some(slot) = record.counter_mut(attr) {
                *slot = Some(value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counter_plain_and_grouped() {
        assert_eq!(parse_counter("0"), Ok(0.0));
        assert_eq!(parse_counter("100"), Ok(100.0));
        assert_eq!(parse_counter("2,854,717,268"), Ok(2_854_717_268.0));
        assert_eq!(parse_counter(" 42 "), Ok(42.0));
    }

    #[test]
    fn test_parse_counter_exact_at_2_pow_53() {
        let v = parse_counter("9007199254740992").unwrap();
        assert_eq!(v, 9_007_199_254_740_992.0);
        assert_eq!(v as u64, 1u64 << 53);
    }

    #[test]
    fn test_parse_counter_rejects_garbage() {
        for raw in ["", ",", "1,", ",1", "12a", "-5", "1.5"] {
            assert!(parse_counter(raw).is_err(), "{raw:?} should fail");
        }
    }

    #[test]
    fn test_parse_counter_rejects_overflow() {
        assert_eq!(parse_counter("18446744073709551615"), Ok(u64::MAX as f64));
        assert!(parse_counter("18446744073709551616").is_err());
        let huge = "9".repeat(400);
        assert_eq!(
            parse_counter(&huge),
            Err(CoercionError::NotACounter(huge.clone()))
        );
    }

    #[test]
    fn test_link_status_is_case_sensitive() {
        assert_eq!(parse_link_status("Up"), LinkStatus::Up);
        assert_eq!(parse_link_status("Down"), LinkStatus::Down);
        assert_eq!(parse_link_status("up"), LinkStatus::Unknown);
        assert_eq!(parse_link_status("Testing"), LinkStatus::Unknown);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Yes"), Ok(true));
        assert_eq!(parse_flag("No"), Ok(false));
        assert_eq!(
            parse_flag("yes"),
            Err(CoercionError::NotAFlag("yes".to_string()))
        );
    }

    #[test]
    fn test_apply_failure_keeps_previous_value() {
        let mut rec = InterfaceRecord::new("1");
        apply(&mut rec, Attr::RxBytes, "10").unwrap();
        assert!(apply(&mut rec, Attr::RxBytes, "oops").is_err());
        assert_eq!(rec.rx_bytes, Some(10.0));
    }

    #[test]
    fn test_apply_text_ignores_blank() {
        let mut rec = InterfaceRecord::new("1");
        apply(&mut rec, Attr::Description, "   ").unwrap();
        assert_eq!(rec.description, None);
        apply(&mut rec, Attr::Description, " uplink ").unwrap();
        assert_eq!(rec.description.as_deref(), Some("uplink"));
    }

    #[test]
    fn test_apply_flag_and_status() {
        let mut rec = InterfaceRecord::new("1");
        apply(&mut rec, Attr::PortEnabled, "No").unwrap();
        apply(&mut rec, Attr::LinkStatus, "Down").unwrap();
        assert_eq!(rec.port_enabled, Some(false));
        assert_eq!(rec.link_status, Some(LinkStatus::Down));
        assert!(apply(&mut rec, Attr::PortEnabled, "Maybe").is_err());
        assert_eq!(rec.port_enabled, Some(false));
    }
}
