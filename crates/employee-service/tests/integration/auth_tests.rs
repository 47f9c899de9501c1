//! Integration tests for `/api/v1/auth` and bearer token enforcement.

use employee_test_utils::fixtures::{register_payload, TEST_PASSWORD};
use employee_test_utils::server_harness::TestApiServer;
use employee_test_utils::TokenAssertions;
use reqwest::StatusCode;
use sqlx::PgPool;

// ============================================================================
// Registration
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_creates_user(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&register_payload("alice"))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@company.com");
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_username_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    server.create_user("alice").await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&serde_json::json!({
            "username": "alice",
            "email": "another@company.com",
            "password": TEST_PASSWORD
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Username already exists");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_short_password_is_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&serde_json::json!({
            "username": "alice",
            "email": "alice@company.com",
            "password": "12345"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "Password must be at least 6 characters long");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_malformed_json_is_bad_request(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .header("Content-Type", "application/json")
        .body("{\"username\": ")
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request data");

    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_issues_token(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let user = server.create_user("alice").await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&serde_json::json!({ "username": "alice", "password": TEST_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["id"], user.id);
    assert!(body["data"]["expires_at"].is_string());

    let token = body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("token missing"))?;
    token
        .assert_valid_jwt()
        .assert_for_user("alice")
        .assert_user_id(user.id)
        .assert_expires_in(server.config().jwt_expiry_seconds);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_failures_are_uniform(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    server.create_user("alice").await?;
    let client = reqwest::Client::new();

    // Act
    let wrong_password = client
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&serde_json::json!({ "username": "alice", "password": "wrong-password" }))
        .send()
        .await?;
    let unknown_user = client
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&serde_json::json!({ "username": "nobody", "password": "wrong-password" }))
        .send()
        .await?;

    // Assert
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: serde_json::Value = wrong_password.json().await?;
    let unknown_user: serde_json::Value = unknown_user.json().await?;
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "Invalid username or password");

    Ok(())
}

// ============================================================================
// Profile and token enforcement
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_profile_returns_token_owner(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let (user, token) = server.create_user_with_token("alice").await?;

    // Act
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/profile", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Profile retrieved successfully");
    assert_eq!(body["data"]["id"], user.id);
    assert_eq!(body["data"]["username"], "alice");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_profile_of_deleted_user_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let (user, token) = server.create_user_with_token("alice").await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(server.pool())
        .await?;

    // Act
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/profile", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "User does not exist");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_route_requires_header(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/employees", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "Missing Authorization header");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_route_rejects_bad_schemes(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    let cases = [
        ("Basic YWxpY2U6c2VjcmV0", "Invalid authorization format"),
        ("Bearer ", "Token required"),
        ("Bearer    ", "Token required"),
        ("Bearer", "Token required"),
        ("Bearer not.a.token", "Invalid token"),
    ];

    for (header, expected_message) in cases {
        // Act
        let response = client
            .get(format!("{}/api/v1/employees", server.url()))
            .header("Authorization", header)
            .send()
            .await?;

        // Assert
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header:?}");
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["message"], expected_message, "{header:?}");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_expired_token_is_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    let user = server.create_user("alice").await?;
    let token = server.create_expired_token(&user, 60)?;

    // Act
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/profile", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "The access token is invalid or expired");

    Ok(())
}
