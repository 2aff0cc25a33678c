//! Report collection from Aruba devices.
//!
//! Fetches CLI report text from every configured device and turns it into
//! interface records, with support for mocking the device sessions in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │   one task per device ──► report.command(ports)             │
//! │                               │                             │
//! │                     ┌─────────▼─────────┐                   │
//! │                     │   CommandRunner   │ (trait)           │
//! │                     └─────────┬─────────┘                   │
//! │                               │ text                        │
//! │                     ┌─────────▼─────────┐                   │
//! │                     │  parser::parse    │                   │
//! │                     └───────────────────┘                   │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//!              ┌─────────────────┼─────────────────┐
//!              │                 │                 │
//!       ┌──────▼──────┐   ┌──────▼──────┐   ┌──────▼──────┐
//!       │  SshRunner  │   │ MockRunner  │   │  Scenarios  │
//!       │  (russh)    │   │ (Testing)   │   │ (Fixtures)  │
//!       └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use aruba_core::collector::{Collector, MockRunner};
//! use aruba_core::config::Config;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut config = Config::new();
//! config.add_targets("sw1").unwrap();
//! let collector = Collector::new(&config, Arc::new(MockRunner::typical_switch("sw1")));
//! let scrapes = collector.collect().await;
//! assert!(scrapes[0].up);
//! # });
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod ssh;
pub mod traits;

pub use collector::{Collector, DeviceScrape, ReportScrape, scrape_device};
pub use mock::MockRunner;
pub use ssh::SshRunner;
pub use traits::{CommandRunner, TransportError};
