//! Bearer token authentication for protected routes.
//!
//! Extracts the token from the Authorization header, validates it with the
//! shared `TokenService`, and injects `Claims` into request extensions.

use crate::errors::ApiError;
use crate::observability::metrics;
use crate::services::token_service::{Claims, TokenService};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<TokenService>,
}

fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .ok_or_else(|| {
            tracing::debug!(target: "employee.middleware.auth", "Missing Authorization header");
            ApiError::MissingAuthorization
        })?
        .to_str()
        .map_err(|_| ApiError::InvalidAuthorizationFormat)?;

    // Header parsing strips trailing whitespace, so "Bearer " arrives as "Bearer".
    let auth_header = auth_header.trim();
    if auth_header == "Bearer" {
        return Err(ApiError::EmptyToken);
    }

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "employee.middleware.auth", "Invalid Authorization header format");
        ApiError::InvalidAuthorizationFormat
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::EmptyToken);
    }

    Ok(token)
}

/// Require a valid bearer token.
///
/// # Response
///
/// - 401 when the header is missing, malformed, or the token fails validation
/// - Otherwise continues with `Claims` in extensions
#[instrument(skip_all, name = "employee.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&req)?;

    let claims = match state.token_service.validate(token, Utc::now()) {
        Ok(claims) => {
            metrics::record_token_validation("success", None);
            claims
        }
        Err(e) => {
            metrics::record_token_validation("error", Some(e.as_str()));
            return Err(ApiError::InvalidToken(e));
        }
    };

    req.extensions_mut().insert::<Claims>(claims);

    Ok(next.run(req).await)
}
