//! Account endpoints under `/api/v1/auth`.

use crate::errors::ApiError;
use crate::handlers::parse_json;
use crate::models::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::routes::AppState;
use crate::services::auth_service;
use crate::services::token_service::Claims;
use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// POST /api/v1/auth/login
#[instrument(skip_all, name = "employee.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let request: LoginRequest = parse_json(&body)?;

    let response = auth_service::login(
        &state.pool,
        &state.token_service,
        &state.dummy_hash,
        request,
        Utc::now(),
    )
    .await?;

    Ok(Json(ApiResponse::success("Login successful", response)))
}

/// POST /api/v1/auth/register
#[instrument(skip_all, name = "employee.handlers.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let request: RegisterRequest = parse_json(&body)?;

    let user = auth_service::register(&state.pool, state.config.bcrypt_cost, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully", user)),
    ))
}

/// GET /api/v1/auth/profile
#[instrument(skip_all, name = "employee.handlers.profile")]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = auth_service::get_profile(&state.pool, &claims).await?;

    Ok(Json(ApiResponse::success("Profile retrieved successfully", user)))
}
