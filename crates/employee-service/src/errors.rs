use crate::services::token_service::TokenError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error type returned by every service operation and HTTP handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Missing Authorization header")]
    MissingAuthorization,

    #[error("Authorization header must start with 'Bearer '")]
    InvalidAuthorizationFormat,

    #[error("Empty token provided")]
    EmptyToken,

    #[error("Invalid token: {0:?}")]
    InvalidToken(TokenError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::NoFieldsToUpdate => StatusCode::BAD_REQUEST,
            ApiError::MissingAuthorization
            | ApiError::InvalidAuthorizationFormat
            | ApiError::EmptyToken
            | ApiError::InvalidToken(_)
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Crypto(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, error) = match &self {
            ApiError::Validation(reason) => ("Invalid request data", reason.clone()),
            ApiError::NoFieldsToUpdate => (
                "No fields to update",
                "At least one field must be provided".to_string(),
            ),
            ApiError::MissingAuthorization => (
                "Authorization required",
                "Missing Authorization header".to_string(),
            ),
            ApiError::InvalidAuthorizationFormat => (
                "Invalid authorization format",
                "Authorization header must start with 'Bearer '".to_string(),
            ),
            ApiError::EmptyToken => ("Token required", "Empty token provided".to_string()),
            ApiError::InvalidToken(reason) => {
                tracing::debug!(target: "employee.auth", reason = ?reason, "Token rejected");
                ("Invalid token", "The access token is invalid or expired".to_string())
            }
            ApiError::InvalidCredentials => (
                "Authentication failed",
                "Invalid username or password".to_string(),
            ),
            ApiError::NotFound(resource) => ("Resource not found", resource.clone()),
            ApiError::Conflict(reason) => ("Resource already exists", reason.clone()),
            ApiError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "employee.database", error = %err, "Database operation failed");
                ("Database error", "An internal database error occurred".to_string())
            }
            ApiError::Crypto(err) => {
                tracing::error!(target: "employee.crypto", error = %err, "Cryptographic operation failed");
                ("Internal error", "An internal error occurred".to_string())
            }
            ApiError::Internal => ("Internal error", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            success: false,
            message,
            error,
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"employee-api\"".parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
