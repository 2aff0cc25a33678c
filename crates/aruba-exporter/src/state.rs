//! Shared application state.

use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, Utc};

use aruba_core::collector::Collector;

pub(crate) struct AppInner {
    pub(crate) collector: Collector,
    pub(crate) telemetry_path: String,
    pub(crate) started_at: DateTime<Utc>,
}

pub(crate) type SharedState = Arc<AppInner>;
pub(crate) type AppState = State<SharedState>;

impl AppInner {
    pub(crate) fn new(collector: Collector, telemetry_path: impl Into<String>) -> Self {
        Self {
            collector,
            telemetry_path: telemetry_path.into(),
            started_at: Utc::now(),
        }
    }
}
