//! Employee service configuration.
//!
//! Configuration is loaded from environment variables. The database URL,
//! JWT secret and default admin password are redacted in Debug output.

use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default token lifetime (24 hours).
pub const DEFAULT_JWT_EXPIRY_SECONDS: i64 = 86_400;

/// Minimum HMAC secret length in bytes (256 bits for HS256).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default maximum number of pooled database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

/// Default per-statement timeout applied by Postgres.
pub const DEFAULT_DB_STATEMENT_TIMEOUT_SECONDS: u64 = 5;

/// Employee service configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// HMAC secret used to sign and verify user tokens.
    pub jwt_secret: SecretString,

    /// Token lifetime in seconds (default: 86400).
    pub jwt_expiry_seconds: i64,

    /// Bcrypt cost factor for password hashing (10-14, default: 12).
    pub bcrypt_cost: u32,

    /// Maximum pooled database connections (default: 25).
    pub db_max_connections: u32,

    /// Postgres `statement_timeout` in seconds (default: 5).
    pub db_statement_timeout_seconds: u64,

    /// Apply embedded migrations at startup (default: true).
    pub run_migrations: bool,

    /// When set, an `admin` user is created at startup if none exists.
    pub default_admin_password: Option<SecretString>,

    /// Seconds to wait after a shutdown signal before stopping (default: 0).
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_seconds", &self.jwt_expiry_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("db_max_connections", &self.db_max_connections)
            .field(
                "db_statement_timeout_seconds",
                &self.db_statement_timeout_seconds,
            )
            .field("run_migrations", &self.run_migrations)
            .field(
                "default_admin_password",
                &self.default_admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = match vars.get("DATABASE_URL") {
            Some(url) => url.clone(),
            None => database_url_from_parts(vars),
        };

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "must be at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }
        let jwt_secret = SecretString::from(jwt_secret.clone());

        let jwt_expiry_seconds: i64 =
            parse_or_default(vars, "JWT_EXPIRY_SECONDS", DEFAULT_JWT_EXPIRY_SECONDS)?;
        if jwt_expiry_seconds <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_EXPIRY_SECONDS",
                reason: format!("must be positive, got {}", jwt_expiry_seconds),
            });
        }

        let bcrypt_cost: u32 = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST",
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
                ),
            });
        }

        let db_max_connections: u32 =
            parse_or_default(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DB_MAX_CONNECTIONS",
                reason: "must be greater than 0".to_string(),
            });
        }

        let db_statement_timeout_seconds: u64 = parse_or_default(
            vars,
            "DB_STATEMENT_TIMEOUT_SECONDS",
            DEFAULT_DB_STATEMENT_TIMEOUT_SECONDS,
        )?;
        if db_statement_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DB_STATEMENT_TIMEOUT_SECONDS",
                reason: "must be greater than 0".to_string(),
            });
        }

        let run_migrations = parse_bool(vars, "RUN_MIGRATIONS", true)?;

        let default_admin_password = vars
            .get("DEFAULT_ADMIN_PASSWORD")
            .filter(|p| !p.is_empty())
            .map(|p| SecretString::from(p.clone()));

        let drain_seconds: u64 = parse_or_default(vars, "DRAIN_SECONDS", 0)?;

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            jwt_expiry_seconds,
            bcrypt_cost,
            db_max_connections,
            db_statement_timeout_seconds,
            run_migrations,
            default_admin_password,
            drain_seconds,
        })
    }

    /// The JWT secret bytes, for building signing and verification keys.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

/// Compose a Postgres URL from the individual `DB_*` variables.
fn database_url_from_parts(vars: &HashMap<String, String>) -> String {
    let get = |name: &str, default: &str| {
        vars.get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    format!(
        "postgresql://{}:{}@{}:{}/{}?sslmode={}",
        get("DB_USER", "postgres"),
        get("DB_PASSWORD", "password"),
        get("DB_HOST", "localhost"),
        get("DB_PORT", "5432"),
        get("DB_NAME", "employee_db"),
        get("DB_SSLMODE", "disable"),
    )
}

fn parse_or_default<T>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(value_str) => value_str
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name,
                reason: format!("expected an integer, got '{}': {}", value_str, e),
            }),
        None => Ok(default),
    }
}

fn parse_bool(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no") => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            name,
            reason: format!("expected a boolean, got '{}'", v),
        }),
    }
}
