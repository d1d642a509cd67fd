// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the certsync daemon.
//!
//! All metrics live in a global registry under the `certsync_` namespace and
//! are exposed via an optional `/metrics` HTTP endpoint.

use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

/// Namespace prefix for all certsync metrics.
const METRICS_NAMESPACE: &str = "certsync";

/// Global Prometheus metrics registry.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliation passes.
pub static PASSES_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_passes_total"),
        "Total number of reconciliation passes",
    );
    let counter = Counter::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation passes in seconds.
pub static PASS_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_pass_duration_seconds"),
        "Duration of reconciliation passes in seconds",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of domain checks by outcome.
///
/// Labels:
/// - `outcome`: `verified`, `unverified`, or `stopped`
pub static DOMAINS_CHECKED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_domains_checked_total"),
        "Total number of domain checks by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of domains permanently stopped at the error threshold.
pub static DOMAINS_STOPPED_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_domains_stopped_total"),
        "Total number of domains permanently stopped at the error threshold",
    );
    let counter = Counter::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of successful certificate operations.
///
/// Labels:
/// - `operation`: `created` or `renewed`
pub static CERTIFICATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_certificates_total"),
        "Total number of successful certificate operations",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record a completed reconciliation pass and its duration.
pub fn record_pass(duration: Duration) {
    PASSES_TOTAL.inc();
    PASS_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record the outcome of a single domain check.
pub fn record_domain_checked(outcome: &str) {
    DOMAINS_CHECKED_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a domain being permanently stopped.
pub fn record_domain_stopped() {
    DOMAINS_STOPPED_TOTAL.inc();
}

/// Record a successful certificate operation (`created` or `renewed`).
pub fn record_certificate(operation: &str) {
    CERTIFICATES_TOTAL.with_label_values(&[operation]).inc();
}

/// Gather and encode all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

/// Router exposing `/metrics`.
#[must_use]
pub fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve the metrics endpoint on `addr` until the server errors.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;
    Ok(())
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {e}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_pass() {
        record_pass(Duration::from_millis(50));

        assert!(PASSES_TOTAL.get() > 0.0);
        assert!(PASS_DURATION_SECONDS.get_sample_count() > 0);
    }

    #[test]
    fn test_record_domain_checked() {
        record_domain_checked("verified");

        let counter = DOMAINS_CHECKED_TOTAL.with_label_values(&["verified"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_certificate("created");

        let result = gather_metrics();
        assert!(result.is_ok(), "Gathering metrics should succeed");

        let metrics_text = result.unwrap();
        assert!(
            metrics_text.contains("certsync"),
            "Metrics should contain namespace prefix"
        );
        assert!(
            metrics_text.contains("certificates_total"),
            "Metrics should contain certificate counter"
        );
    }
}
