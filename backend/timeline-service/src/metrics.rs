//! Prometheus metrics for timeline-service.
//!
//! Exposes feed-specific collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Total feed requests processed, segmented by outcome.
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "timeline_feed_requests_total",
        "Total feed requests segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register timeline_feed_requests_total");

    /// Duration of feed requests by outcome.
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "timeline_feed_request_duration_seconds",
        "Feed request duration segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register timeline_feed_request_duration_seconds");

    /// Number of candidate rows the recency window actually returned.
    pub static ref FEED_CANDIDATE_WINDOW_ROWS: Histogram = register_histogram!(
        "timeline_feed_candidate_window_rows",
        "Candidate rows fetched per feed request",
        vec![0.0, 30.0, 60.0, 120.0, 240.0, 360.0, 480.0, 600.0]
    )
    .expect("failed to register timeline_feed_candidate_window_rows");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
