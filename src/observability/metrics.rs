//! Metrics collection.
//!
//! # Metrics
//! - `route_engine_resolutions_total` (counter): resolutions by outcome
//! - `route_engine_resolution_duration_seconds` (histogram): resolution latency
//! - `route_engine_pattern_compilations_total` (counter): path regexes compiled
//! - `route_engine_collector_failures_total` (counter): failures by collector

use std::time::Duration;

/// Record one request resolution. `outcome` is `matched`, `miss`, `error` or `timeout`.
pub fn record_resolution(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("route_engine_resolutions_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("route_engine_resolution_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_compilation() {
    ::metrics::counter!("route_engine_pattern_compilations_total").increment(1);
}

pub fn record_collector_failure(collector: &str) {
    ::metrics::counter!(
        "route_engine_collector_failures_total",
        "collector" => collector.to_string()
    )
    .increment(1);
}
