//! Prometheus metrics for the prediction service.
//!
//! All metrics live in a process-global registry and are exported through
//! the `/metrics` endpoint in the text exposition format. HTTP-level
//! metrics are recorded by the [`track_http`] middleware; prediction
//! counters are incremented by the API handlers.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("comment_sentiment"),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace("comment_sentiment")
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Total number of predictions served, by predicted label
    ///
    /// Labels: label
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of predictions served")
            .namespace("comment_sentiment"),
        &["label"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Predictions that fell back to the neutral default because the
    /// comment produced no usable features
    pub static ref PREDICTION_FALLBACKS_TOTAL: Counter = Counter::with_opts(
        Opts::new(
            "prediction_fallbacks_total",
            "Predictions answered with the neutral fallback"
        )
        .namespace("comment_sentiment")
    ).expect("Failed to create PREDICTION_FALLBACKS_TOTAL metric");

    /// Number of comments per batch prediction request
    pub static ref PREDICTION_BATCH_SIZE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "prediction_batch_size",
            "Number of comments per batch prediction request"
        )
        .namespace("comment_sentiment")
        .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])
    ).expect("Failed to create PREDICTION_BATCH_SIZE metric");
}

/// Initialize all Prometheus metrics
///
/// This should be called once at application startup.
///
/// # Errors
/// Returns an error if any metric fails to register (typically only happens
/// if metrics are registered multiple times).
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_FALLBACKS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_BATCH_SIZE.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Generate Prometheus text format metrics
///
/// This function is used by the /metrics endpoint to export metrics
/// in the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// Axum middleware function for HTTP metrics collection
///
/// Uses the matched route template as the path label so that metrics stay
/// low-cardinality even under arbitrary request paths.
pub async fn track_http(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}
