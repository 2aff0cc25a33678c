use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use aruba_core::device::{DeviceKind, ReportKind};
use aruba_core::fmt::{FmtStyle, format_counter, format_flag, format_link, format_opt_bytes, truncate};
use aruba_core::parser::{self, ParsedReport};
use aruba_core::record::InterfaceRecord;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "aruba-dump",
    about = "Parse a captured Aruba CLI transcript",
    version = aruba_core::VERSION
)]
struct Cli {
    /// Transcript file, or `-` for stdin
    path: PathBuf,

    /// Report the transcript contains (port-counters, vlan-traffic)
    #[arg(long, default_value = "port-counters")]
    report: ReportKind,

    /// Device kind that produced the transcript
    #[arg(long, default_value = "aruba_switch")]
    device: DeviceKind,

    /// Show byte counters as human-readable sizes
    #[arg(long)]
    human: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = read_input(&cli.path)?;
    let parsed = parser::parse(cli.device, cli.report, &text)?;

    if cli.json {
        let out = JsonOutput::new(cli, &parsed);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_table(cli.report, &parsed.records, cli.human));
        println!(
            "\n{} records, {} warnings, {} orphan lines",
            parsed.records.len(),
            parsed.warnings.len(),
            parsed.orphan_lines
        );
        for warning in &parsed.warnings {
            eprintln!("warning: {warning}");
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

// ── JSON output ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonOutput<'a> {
    device: DeviceKind,
    report: ReportKind,
    records: &'a [InterfaceRecord],
    warnings: Vec<String>,
    orphan_lines: usize,
}

impl<'a> JsonOutput<'a> {
    fn new(cli: &Cli, parsed: &'a ParsedReport) -> Self {
        Self {
            device: cli.device,
            report: cli.report,
            records: &parsed.records,
            warnings: parsed.warnings.iter().map(|w| w.to_string()).collect(),
            orphan_lines: parsed.orphan_lines,
        }
    }
}

// ── Table output ─────────────────────────────────────────────────────────────

fn render_table(report: ReportKind, records: &[InterfaceRecord], human: bool) -> String {
    let bytes = |v: Option<f64>| {
        if human {
            format_opt_bytes(v, FmtStyle::Compact)
        } else {
            format_counter(v)
        }
    };

    let mut out = String::new();
    match report {
        ReportKind::PortCounters => {
            out.push_str(&format!(
                "{:<10} {:<5} {:<4} {:>16} {:>16} {:>12} {:>12} {:>8} {:>8} {:>8}  {}\n",
                "PORT",
                "LINK",
                "EN",
                "RX BYTES",
                "TX BYTES",
                "RX UCAST",
                "TX UCAST",
                "RX DROP",
                "TX DROP",
                "RX ERR",
                "NAME"
            ));
            for r in records {
                out.push_str(&format!(
                    "{:<10} {:<5} {:<4} {:>16} {:>16} {:>12} {:>12} {:>8} {:>8} {:>8}  {}\n",
                    truncate(&r.name, 10),
                    format_link(r.link_status),
                    format_flag(r.port_enabled),
                    bytes(r.rx_bytes),
                    bytes(r.tx_bytes),
                    format_counter(r.rx_unicast),
                    format_counter(r.tx_unicast),
                    format_counter(r.rx_drops),
                    format_counter(r.tx_drops),
                    format_counter(r.rx_errors),
                    r.description.as_deref().unwrap_or(""),
                ));
            }
        }
        ReportKind::VlanTraffic => {
            out.push_str(&format!("{:<20} {:>16} {:>16}\n", "INTERFACE", "INPUT", "OUTPUT"));
            for r in records {
                out.push_str(&format!(
                    "{:<20} {:>16} {:>16}\n",
                    truncate(&r.name, 20),
                    bytes(r.input_bytes),
                    bytes(r.output_bytes),
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use aruba_core::collector::mock::scenarios::{SWITCH_PORT_COUNTERS, SWITCH_VLAN_TRAFFIC};

    fn parse(report: ReportKind, text: &str) -> ParsedReport {
        parser::parse(DeviceKind::ArubaSwitch, report, text).unwrap()
    }

    #[test]
    fn test_cli_parses_report_and_device() {
        let cli = Cli::try_parse_from([
            "aruba-dump",
            "-",
            "--report",
            "vlan-traffic",
            "--device",
            "switch",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.report, ReportKind::VlanTraffic);
        assert_eq!(cli.device, DeviceKind::ArubaSwitch);
        assert!(cli.json);

        assert!(Cli::try_parse_from(["aruba-dump", "x", "--report", "lldp"]).is_err());
    }

    #[test]
    fn test_port_table() {
        let parsed = parse(ReportKind::PortCounters, SWITCH_PORT_COUNTERS);
        let table = render_table(ReportKind::PortCounters, &parsed.records, false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PORT"));
        assert!(lines[1].starts_with("1/1        up    yes"));
        assert!(lines[1].contains("2,854,717,268"));
        assert!(lines[1].ends_with("uplink-core"));
        assert!(lines[2].starts_with("1/2        down  no"));
    }

    #[test]
    fn test_vlan_table_human() {
        let parsed = parse(ReportKind::VlanTraffic, SWITCH_VLAN_TRAFFIC);
        let table = render_table(ReportKind::VlanTraffic, &parsed.records, true);

        assert!(table.contains("vlan1.1"));
        assert!(table.contains("94.1K"));
        assert!(table.contains("500B"));
    }

    #[test]
    fn test_json_output() {
        let cli = Cli::try_parse_from(["aruba-dump", "-", "--json"]).unwrap();
        let parsed = parse(
            ReportKind::PortCounters,
            " Status and Counters - Port Counters for port 9\n  Link Status : Up\n  Bytes Rx : x   Bytes Tx : 1\n",
        );
        let value = serde_json::to_value(JsonOutput::new(&cli, &parsed)).unwrap();

        assert_eq!(value["device"], "aruba_switch");
        assert_eq!(value["report"], "port_counters");
        assert_eq!(value["records"][0]["name"], "9");
        assert_eq!(value["records"][0]["link_status"], "up");
        assert_eq!(value["records"][0]["tx_bytes"], 1.0);
        assert!(value["records"][0].get("rx_bytes").is_none());
        assert_eq!(value["warnings"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_unsupported_device_fails() {
        let err = parser::parse(DeviceKind::ArubaInstant, ReportKind::PortCounters, "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'show interfaces' is not implemented for aruba_instant"
        );
    }
}
