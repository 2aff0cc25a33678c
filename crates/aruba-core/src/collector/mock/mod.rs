//! Mock command runner and switch transcripts for tests and offline runs.

mod runner;
pub mod scenarios;

pub use runner::MockRunner;
