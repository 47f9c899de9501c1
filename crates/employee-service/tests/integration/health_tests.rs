//! Integration tests for operational endpoints.

use employee_test_utils::server_harness::TestApiServer;
use reqwest::StatusCode;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_reports_ok(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body,
        serde_json::json!({
            "status": "ok",
            "message": "Employee Management API is running"
        })
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ready_checks_database(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ready_fails_when_database_closed(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;
    server.pool().close().await;

    // Act
    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_metrics_endpoint_is_public(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act
    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_cors_preflight_is_answered(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn(pool).await?;

    // Act - preflight carries no Authorization header
    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/api/v1/employees", server.url()),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));

    Ok(())
}
