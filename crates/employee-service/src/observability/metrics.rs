//! Metrics definitions for the employee service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `employee_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP verbs
//! - `path`: fixed route templates (numeric ids collapse to `{id}`)
//! - `operation`, `table`: bounded by code
//! - `status`: success, error
//! - `reason`: `TokenError` labels

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used by
/// `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("employee_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("employee_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        // Coarse buckets so password timing is not observable in detail
        .set_buckets_for_metric(
            Matcher::Prefix("employee_bcrypt".to_string()),
            &[0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `employee_http_requests_total`, `employee_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("employee_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("employee_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse request paths onto route templates.
fn normalize_path(path: &str) -> String {
    match path {
        "/health" | "/ready" | "/metrics" | "/api/v1/auth/register" | "/api/v1/auth/login"
        | "/api/v1/auth/profile" | "/api/v1/employees" => path.to_string(),
        _ => match path.strip_prefix("/api/v1/employees/") {
            Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                "/api/v1/employees/{id}".to_string()
            }
            _ => "/other".to_string(),
        },
    }
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record a bearer token validation.
///
/// Metric: `employee_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    counter!("employee_token_validations_total",
        "status" => status.to_string(),
        "reason" => reason.unwrap_or("none").to_string()
    )
    .increment(1);
}

/// Record a login attempt.
///
/// Metric: `employee_logins_total`
/// Labels: `status`
pub fn record_login(status: &str) {
    counter!("employee_logins_total", "status" => status.to_string()).increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `employee_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("employee_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `employee_db_query_duration_seconds`, `employee_db_queries_total`
/// Labels: `operation`, `table`, `status`
pub fn record_db_query(operation: &str, table: &str, status: &str, duration: Duration) {
    histogram!("employee_db_query_duration_seconds",
        "operation" => operation.to_string(),
        "table" => table.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("employee_db_queries_total",
        "operation" => operation.to_string(),
        "table" => table.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
