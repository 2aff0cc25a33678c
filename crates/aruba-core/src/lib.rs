//! aruba-core: shared library for the Aruba exporter.
//!
//! Provides:
//! - `parser`: pattern registry and section state machine turning CLI
//!   report text into interface records
//! - `record`: interface records and their attributes
//! - `device`: device kinds and report kinds
//! - `collector`: per-device report fetching (SSH or mock)
//! - `metrics`: Prometheus rendering of scrape results
//! - `config`: exporter configuration and device inventory
//! - `fmt`: shared formatting helpers (bytes, counters)

pub mod collector;
pub mod config;
pub mod device;
pub mod fmt;
pub mod metrics;
pub mod parser;
pub mod record;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
