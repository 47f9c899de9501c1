//! Deterministic configuration and payload fixtures.

use common::secret::SecretString;
use employee_service::config::Config;
use serde_json::{json, Value};

/// HMAC secret shared by every test server.
pub const TEST_JWT_SECRET: &str = "employee-test-secret-at-least-32-bytes!!";

/// Lowest accepted bcrypt cost, to keep tests fast.
pub const TEST_BCRYPT_COST: u32 = 10;

/// Password used for users created through fixtures.
pub const TEST_PASSWORD: &str = "secret123";

/// Configuration for an in-process test server.
///
/// `database_url` is empty: the pool is supplied directly.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret: SecretString::from(TEST_JWT_SECRET.to_string()),
        jwt_expiry_seconds: employee_service::config::DEFAULT_JWT_EXPIRY_SECONDS,
        bcrypt_cost: TEST_BCRYPT_COST,
        db_max_connections: 5,
        db_statement_timeout_seconds: 5,
        run_migrations: false,
        default_admin_password: None,
        drain_seconds: 0,
    }
}

/// A complete, valid create-employee body.
///
/// # Example
/// ```rust,ignore
/// let body = employee_payload("EMP001", "budi@company.com");
/// ```
pub fn employee_payload(nip: &str, email: &str) -> Value {
    json!({
        "nip": nip,
        "name": "Budi Santoso",
        "email": email,
        "phone": "081234567890",
        "position": "Software Engineer",
        "department": "Engineering",
        "salary": 15000000.0,
        "hire_date": "2023-01-15"
    })
}

/// Registration body for `username` with a derived email and
/// `TEST_PASSWORD`.
pub fn register_payload(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@company.com", username),
        "password": TEST_PASSWORD
    })
}
