//! HTTP request handlers.

pub mod auth_handler;
pub mod employee_handler;
pub mod health;
pub mod metrics;

pub use auth_handler::{login, profile, register};
pub use employee_handler::{
    create_employee, delete_employee, get_employee, list_employees, update_employee,
};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;

use crate::errors::ApiError;
use serde::de::DeserializeOwned;

/// Deserialize a JSON request body, mapping failures to 400 rather than
/// axum's default 422.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "employee.handlers", error = %e, "Invalid request body");
        ApiError::Validation(format!("Invalid request body: {}", e))
    })
}
