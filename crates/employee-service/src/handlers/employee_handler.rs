//! Employee endpoints under `/api/v1/employees`.
//!
//! All routes here sit behind `require_auth`.

use crate::errors::ApiError;
use crate::handlers::parse_json;
use crate::models::{
    ApiResponse, CreateEmployeeRequest, Employee, EmployeeFilter, EmployeeListResponse,
    EmployeeUpdate, ListEmployeesQuery,
};
use crate::routes::AppState;
use crate::services::employee_service;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Parse the `:id` path segment.
fn parse_employee_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::Validation("Employee ID must be a number".to_string()))
}

/// POST /api/v1/employees
#[instrument(skip_all, name = "employee.handlers.create")]
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Employee>>), ApiError> {
    let request: CreateEmployeeRequest = parse_json(&body)?;

    let employee = employee_service::create_employee(&state.pool, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Employee created successfully", employee)),
    ))
}

/// GET /api/v1/employees
#[instrument(skip_all, name = "employee.handlers.list")]
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListEmployeesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<EmployeeListResponse>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let filter = EmployeeFilter::try_from(query)?;

    let page = employee_service::list_employees(&state.pool, &filter).await?;

    Ok(Json(ApiResponse::success(
        "Employees retrieved successfully",
        page,
    )))
}

/// GET /api/v1/employees/:id
#[instrument(skip_all, name = "employee.handlers.get")]
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    let id = parse_employee_id(&id)?;

    let employee = employee_service::get_employee(&state.pool, id).await?;

    Ok(Json(ApiResponse::success(
        "Employee retrieved successfully",
        employee,
    )))
}

/// PUT /api/v1/employees/:id
///
/// Partial update: only fields present in the body change.
#[instrument(skip_all, name = "employee.handlers.update")]
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    let id = parse_employee_id(&id)?;
    let update: EmployeeUpdate = parse_json(&body)?;

    let employee = employee_service::update_employee(&state.pool, id, update).await?;

    Ok(Json(ApiResponse::success(
        "Employee updated successfully",
        employee,
    )))
}

/// DELETE /api/v1/employees/:id
///
/// Soft delete; the record stays readable with `is_active = false`.
#[instrument(skip_all, name = "employee.handlers.delete")]
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_employee_id(&id)?;

    employee_service::delete_employee(&state.pool, id).await?;

    Ok(Json(ApiResponse::message("Employee deleted successfully")))
}
