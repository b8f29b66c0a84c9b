//! Prometheus metrics: name constants, descriptions, and the exporter.

use std::net::SocketAddr;

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const HTTP_RESPONSES_TOTAL: &str = "lexgate_http_responses_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "lexgate_http_request_duration_seconds";
pub const ADMISSION_REJECTED_TOTAL: &str = "lexgate_admission_rejected_total";
pub const POOL_LEASE_TIMEOUTS_TOTAL: &str = "lexgate_pool_lease_timeouts_total";

/// Installs the Prometheus exporter on its own listener and registers
/// metric descriptions.
///
/// # Errors
///
/// Returns an error when the exporter cannot bind its address.
pub fn install(address: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    describe_counter!(
        HTTP_RESPONSES_TOTAL,
        "Responses sent, labeled by operation and status code"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "End-to-end request latency, labeled by operation"
    );
    describe_counter!(
        ADMISSION_REJECTED_TOTAL,
        "Requests rejected by the rate limiter, labeled by operation"
    );
    describe_counter!(
        POOL_LEASE_TIMEOUTS_TOTAL,
        "Channel-pool lease waits that timed out, labeled by downstream"
    );
    Ok(())
}
