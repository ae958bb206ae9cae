//! Prometheus-compatible metrics endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Server start time
    start_time: Instant,
    /// Burn requests received
    request_count: RwLock<u64>,
    /// Burn requests that returned a video
    completed_count: RwLock<u64>,
    /// Subtitle blocks or segments dropped during conversion
    skipped_segments: RwLock<u64>,
    /// Total video bytes served
    bytes_served: RwLock<u64>,
    /// Failures by error kind
    errors_by_kind: RwLock<BTreeMap<String, u64>>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            request_count: RwLock::new(0),
            completed_count: RwLock::new(0),
            skipped_segments: RwLock::new(0),
            bytes_served: RwLock::new(0),
            errors_by_kind: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn record_request(&self) {
        *self.request_count.write() += 1;
    }

    pub fn record_completed(&self, bytes: u64) {
        *self.completed_count.write() += 1;
        *self.bytes_served.write() += bytes;
    }

    pub fn record_skipped(&self, count: u64) {
        *self.skipped_segments.write() += count;
    }

    pub fn record_error(&self, kind: &str) {
        *self
            .errors_by_kind
            .write()
            .entry(kind.to_string())
            .or_insert(0) += 1;
    }

    pub fn request_count(&self) -> u64 {
        *self.request_count.read()
    }

    #[cfg(test)]
    pub fn error_count(&self, kind: &str) -> u64 {
        self.errors_by_kind.read().get(kind).copied().unwrap_or(0)
    }

    /// Render in Prometheus text exposition format
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP burn_uptime_seconds Server uptime in seconds\n");
        out.push_str("# TYPE burn_uptime_seconds gauge\n");
        out.push_str(&format!(
            "burn_uptime_seconds {}\n",
            self.start_time.elapsed().as_secs()
        ));

        out.push_str("# HELP burn_requests_total Burn requests received\n");
        out.push_str("# TYPE burn_requests_total counter\n");
        out.push_str(&format!("burn_requests_total {}\n", self.request_count()));

        out.push_str("# HELP burn_completed_total Burn requests that returned a video\n");
        out.push_str("# TYPE burn_completed_total counter\n");
        out.push_str(&format!(
            "burn_completed_total {}\n",
            *self.completed_count.read()
        ));

        out.push_str("# HELP burn_skipped_segments_total Subtitle segments dropped during conversion\n");
        out.push_str("# TYPE burn_skipped_segments_total counter\n");
        out.push_str(&format!(
            "burn_skipped_segments_total {}\n",
            *self.skipped_segments.read()
        ));

        out.push_str("# HELP burn_bytes_served_total Video bytes returned\n");
        out.push_str("# TYPE burn_bytes_served_total counter\n");
        out.push_str(&format!(
            "burn_bytes_served_total {}\n",
            *self.bytes_served.read()
        ));

        out.push_str("# HELP burn_errors_total Failed burn requests by kind\n");
        out.push_str("# TYPE burn_errors_total counter\n");
        for (kind, count) in self.errors_by_kind.read().iter() {
            out.push_str(&format!("burn_errors_total{{kind=\"{}\"}} {}\n", kind, count));
        }

        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
