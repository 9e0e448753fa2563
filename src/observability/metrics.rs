//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserver_proxy_requests_total` (counter): forwarded requests by rule, status
//! - `devserver_proxy_request_duration_seconds` (histogram): upstream latency by rule
//! - `devserver_health_view_settled_total` (counter): view settlements by outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Returns `None` when a recorder is already installed or the address
/// cannot be bound.
pub async fn init_metrics(addr: SocketAddr) -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder not installed");
            return None;
        }
    };
    describe_metrics();

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to bind metrics listener");
            return None;
        }
    };

    let render = handle.clone();
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let render = render.clone();
            async move { render.render() }
        }),
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Metrics server stopped");
        }
    });

    Some(handle)
}

fn describe_metrics() {
    describe_counter!("devserver_proxy_requests_total", "Requests forwarded to the backend");
    describe_histogram!(
        "devserver_proxy_request_duration_seconds",
        "Time until the backend answered a forwarded request"
    );
    describe_counter!("devserver_health_view_settled_total", "Health view settlements");
}

/// Record one forwarded request.
pub fn record_proxied_request(rule: &str, status: u16, start: Instant) {
    counter!(
        "devserver_proxy_requests_total",
        "rule" => rule.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("devserver_proxy_request_duration_seconds", "rule" => rule.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one health view settlement.
pub fn record_view_settled(display: &'static str) {
    counter!("devserver_health_view_settled_total", "display" => display).increment(1);
}
