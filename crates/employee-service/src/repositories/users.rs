//! User repository module for database operations.

use crate::errors::ApiError;
use crate::models::User;
use crate::observability::metrics;
use crate::repositories::map_write_error;
use sqlx::PgPool;
use std::time::Instant;

fn record<T, E>(operation: &str, result: &Result<T, E>, start: Instant) {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_db_query(operation, "users", status, start.elapsed());
}

/// Get user by username.
pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to fetch user by username: {}", e)))
}

/// Get user by id.
pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {}", e)))
}

/// Check if a username is taken.
pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result: Result<bool, _> =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"#)
            .bind(username)
            .fetch_one(pool)
            .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to check username: {}", e)))
}

/// Check if an email is taken.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result: Result<bool, _> =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#)
            .bind(email)
            .fetch_one(pool)
            .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to check email: {}", e)))
}

/// Create a new user.
///
/// A duplicate username or email surfaces as `ApiError::Conflict`.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password_hash, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await;
    record("insert", &result, start);

    result.map_err(|e| map_write_error(e, "Failed to create user"))
}
