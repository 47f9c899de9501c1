//! Account registration, login and profile lookup.

use crate::crypto;
use crate::errors::ApiError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::observability::metrics;
use crate::repositories::users;
use crate::services::token_service::{Claims, TokenService};
use chrono::{DateTime, Utc};
use common::secret::{ExposeSecret, SecretString};
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 100;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@company.com";

const DUMMY_PASSWORD: &str = "employee-api-unknown-user";

/// Hash a throwaway password at `bcrypt_cost`.
///
/// Login verifies against this hash when the username is unknown, so both
/// failure paths pay for one bcrypt verification at the configured cost.
/// Computed once at startup.
pub fn dummy_password_hash(bcrypt_cost: u32) -> Result<String, ApiError> {
    crypto::hash_password(DUMMY_PASSWORD, bcrypt_cost)
}

/// Register a new user account.
///
/// # Steps
///
/// 1. Validate username, email and password
/// 2. Reject a taken username, then a taken email
/// 3. Hash the password and insert
#[instrument(skip_all, name = "employee.auth.register")]
pub async fn register(
    pool: &PgPool,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<UserInfo, ApiError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    let username_len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username_len) {
        return Err(ApiError::Validation(format!(
            "username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }

    if email.chars().count() > MAX_EMAIL_LENGTH || !crypto::is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    if !crypto::validate_password_strength(request.password.expose_secret()) {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            crypto::MIN_PASSWORD_LENGTH
        )));
    }

    if users::username_exists(pool, &username).await? {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    if users::email_exists(pool, &email).await? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_blocking(request.password, bcrypt_cost).await?;
    let user = users::create_user(pool, &username, &email, &password_hash).await?;

    tracing::info!(target: "employee.auth", user_id = user.id, "User registered");

    Ok(UserInfo::from(&user))
}

/// Authenticate by username and password and issue a bearer token.
///
/// Unknown usernames and wrong passwords produce the same error. For an
/// unknown username the password is checked against `dummy_hash`.
#[instrument(skip_all, name = "employee.auth.login")]
pub async fn login(
    pool: &PgPool,
    tokens: &TokenService,
    dummy_hash: &str,
    request: LoginRequest,
    now: DateTime<Utc>,
) -> Result<LoginResponse, ApiError> {
    let username = request.username.trim();
    if username.is_empty() || request.password.expose_secret().is_empty() {
        metrics::record_login("invalid_request");
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = users::get_by_username(pool, username).await?;

    let hash = user
        .as_ref()
        .map_or_else(|| dummy_hash.to_string(), |u| u.password_hash.clone());
    let password_valid = verify_blocking(request.password, hash).await?;

    let user = match user {
        Some(user) if password_valid => user,
        _ => {
            metrics::record_login("invalid_credentials");
            tracing::debug!(target: "employee.auth", "Login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let info = UserInfo::from(&user);
    let (token, expires_at) = tokens.issue(&info, now)?;

    metrics::record_login("success");
    tracing::info!(target: "employee.auth", user_id = info.id, "User logged in");

    Ok(LoginResponse {
        token,
        user: info,
        expires_at,
    })
}

/// Look up the account a validated token belongs to.
#[instrument(skip_all, name = "employee.auth.profile", fields(user_id = claims.user_id))]
pub async fn get_profile(pool: &PgPool, claims: &Claims) -> Result<UserInfo, ApiError> {
    let user = users::get_by_id(pool, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    Ok(UserInfo::from(&user))
}

/// Create the `admin` account if no user holds that username.
///
/// Returns `true` when an account was created.
#[instrument(skip_all, name = "employee.auth.ensure_default_admin")]
pub async fn ensure_default_admin(
    pool: &PgPool,
    password: &SecretString,
    bcrypt_cost: u32,
) -> Result<bool, ApiError> {
    if users::username_exists(pool, DEFAULT_ADMIN_USERNAME).await? {
        return Ok(false);
    }

    let password_hash = hash_blocking(password.clone(), bcrypt_cost).await?;

    match users::create_user(pool, DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_EMAIL, &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!(target: "employee.auth", user_id = user.id, "Default admin created");
            Ok(true)
        }
        // Another instance seeded it first.
        Err(ApiError::Conflict(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run bcrypt hashing on the blocking pool.
async fn hash_blocking(password: SecretString, cost: u32) -> Result<String, ApiError> {
    let start = Instant::now();
    let result =
        tokio::task::spawn_blocking(move || crypto::hash_password(password.expose_secret(), cost))
            .await
            .map_err(|e| {
                tracing::error!(target: "employee.auth", "spawn_blocking join error: {e}");
                ApiError::Internal
            })?;
    metrics::record_bcrypt_duration("hash", start.elapsed());
    result
}

/// Run bcrypt verification on the blocking pool.
async fn verify_blocking(password: SecretString, hash: String) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        crypto::verify_password(password.expose_secret(), &hash)
    })
    .await
    .map_err(|e| {
        tracing::error!(target: "employee.auth", "spawn_blocking join error: {e}");
        ApiError::Internal
    })?;
    metrics::record_bcrypt_duration("verify", start.elapsed());
    result
}
