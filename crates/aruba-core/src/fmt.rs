//! Shared formatting helpers for the dump tables.
//!
//! Functions that differ between compact table columns and verbose detail
//! output are parameterized via [`FmtStyle`].

use crate::record::LinkStatus;

/// Controls compact (table columns) vs verbose (detail lines) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB")
    Detail,
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if bytes >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Byte counter for a table cell, `"-"` when the device did not report it.
pub fn format_opt_bytes(bytes: Option<f64>, style: FmtStyle) -> String {
    match bytes {
        Some(v) if v >= 0.0 => format_bytes(v as u64, style),
        _ => "-".to_string(),
    }
}

/// Counter with thousands separators, as the switch prints it.
pub fn format_counter(v: Option<f64>) -> String {
    let Some(v) = v else {
        return "-".to_string();
    };
    let digits = format!("{:.0}", v.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_link(status: Option<LinkStatus>) -> &'static str {
    match status {
        Some(LinkStatus::Up) => "up",
        Some(LinkStatus::Down) => "down",
        Some(LinkStatus::Unknown) => "?",
        None => "-",
    }
}

pub fn format_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

/// Truncate string to max length, appending ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
