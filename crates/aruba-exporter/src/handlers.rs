//! HTTP handlers for the landing page, metrics and health endpoints.

use std::time::Instant;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error};

use aruba_core::metrics::ScrapeMetrics;

use crate::state::AppState;

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

pub(crate) async fn handle_landing(State(state): AppState) -> Html<String> {
    Html(format!(
        r#"<html>
  <head>
    <title>Aruba Exporter (Version {version})</title>
  </head>
  <body>
    <h1>Aruba Exporter</h1>
    <p><a href="{path}">Metrics</a></p>
    <p>Devices: {devices}</p>
    <p>Running since {started}</p>
  </body>
</html>
"#,
        version = aruba_core::VERSION,
        path = state.telemetry_path,
        devices = state.collector.devices().len(),
        started = state.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ))
}

/// Scrapes every device and renders the results into a fresh registry.
///
/// Device failures only show up as `aruba_up 0`; the response is an error only
/// when the exposition itself cannot be produced.
pub(crate) async fn handle_metrics(State(state): AppState) -> Response {
    let started = Instant::now();
    let scrapes = state.collector.collect().await;

    let metrics = match ScrapeMetrics::new() {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "registering metrics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "registry error").into_response();
        }
    };
    for scrape in &scrapes {
        metrics.record(scrape);
    }

    match metrics.encode() {
        Ok(text) => {
            debug!(
                devices = scrapes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "metrics served"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                text,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "encoding metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "encoding error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use aruba_core::collector::{Collector, MockRunner};
    use aruba_core::config::Config;

    use crate::router;
    use crate::state::AppInner;

    fn app(targets: &str, runner: MockRunner) -> axum::Router {
        let mut config = Config::new();
        config.add_targets(targets).unwrap();
        let collector = Collector::new(&config, Arc::new(runner));
        router(Arc::new(AppInner::new(collector, "/metrics")))
    }

    async fn get(app: axum::Router, uri: &str) -> (u16, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app("sw1", MockRunner::new()), "/healthz").await;
        assert_eq!(status, 200);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_landing_links_metrics() {
        let (status, body) = get(app("sw1,sw2", MockRunner::new()), "/").await;
        assert_eq!(status, 200);
        assert!(body.contains(r#"<a href="/metrics">Metrics</a>"#));
        assert!(body.contains("Devices: 2"));
    }

    #[tokio::test]
    async fn test_metrics_scrape() {
        let runner = MockRunner::typical_switch("sw1").with_unreachable("sw2");
        let (status, body) = get(app("sw1,sw2", runner), "/metrics").await;
        assert_eq!(status, 200);
        assert!(body.contains(r#"aruba_up{target="sw1"} 1"#));
        assert!(body.contains(r#"aruba_up{target="sw2"} 0"#));
        assert!(body.contains("aruba_interface_rx_bytes{"));
        assert!(body.contains("aruba_vlan_input_bytes{"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, _) = get(app("sw1", MockRunner::new()), "/nope").await;
        assert_eq!(status, 404);
    }
}
