//! Integration tests for `/api/v1/employees`.

use employee_test_utils::fixtures::employee_payload;
use employee_test_utils::server_harness::TestApiServer;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Spawned server plus a bearer token for an existing user.
struct Fixture {
    server: TestApiServer,
    client: Client,
    token: String,
}

impl Fixture {
    async fn new(pool: PgPool) -> Result<Self, anyhow::Error> {
        let server = TestApiServer::spawn(pool).await?;
        let (_, token) = server.create_user_with_token("admin").await?;
        Ok(Self {
            server,
            client: Client::new(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/employees{}", self.server.url(), path)
    }

    async fn create(&self, body: &Value) -> Result<(StatusCode, Value), anyhow::Error> {
        let response = self
            .client
            .post(self.url(""))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Value), anyhow::Error> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<(StatusCode, Value), anyhow::Error> {
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }

    async fn delete(&self, path: &str) -> Result<(StatusCode, Value), anyhow::Error> {
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }

    /// Create an employee and return its id.
    async fn seed(&self, body: &Value) -> Result<i64, anyhow::Error> {
        let (status, body) = self.create(body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "seed failed: {body}");
        body["data"]["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("created employee has no id"))
    }
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]["employees"]
        .as_array()
        .map(|list| list.iter().filter_map(|e| e["id"].as_i64()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Create
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_then_get(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, created) = fx
        .create(&employee_payload("EMP001", "budi@company.com"))
        .await?;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Employee created successfully");
    assert_eq!(created["data"]["nip"], "EMP001");
    assert_eq!(created["data"]["is_active"], true);
    assert_eq!(created["data"]["hire_date"], "2023-01-15");
    assert_eq!(created["data"]["salary"], 15000000.0);

    let id = created["data"]["id"].as_i64().unwrap_or_default();
    let (status, fetched) = fx.get(&format!("/{id}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["message"], "Employee retrieved successfully");
    assert_eq!(fetched["data"], created["data"]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_without_optional_fields(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let body = json!({
        "nip": "EMP001",
        "name": "Budi",
        "email": "budi@company.com",
        "position": "Engineer",
        "department": "Engineering",
        "hire_date": "2023-01-15"
    });

    // Act
    let (status, created) = fx.create(&body).await?;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["data"]["phone"].is_null());
    assert!(created["data"]["salary"].is_null());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_rejects_bad_hire_date(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let mut body = employee_payload("EMP001", "budi@company.com");
    body["hire_date"] = json!("15/01/2023");

    // Act
    let (status, response) = fx.create(&body).await?;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert!(response["error"]
        .as_str()
        .is_some_and(|e| e.contains("YYYY-MM-DD")));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_rejects_missing_required_field(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let mut body = employee_payload("EMP001", "budi@company.com");
    if let Some(object) = body.as_object_mut() {
        object.remove("name");
    }

    // Act
    let (status, response) = fx.create(&body).await?;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "name is required");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_duplicate_nip_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let id = fx
        .seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;
    let (_, before) = fx.get(&format!("/{id}")).await?;

    // Act
    let (status, response) = fx
        .create(&employee_payload("EMP001", "other@company.com"))
        .await?;

    // Assert
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "Employee with this NIP already exists");

    let (_, after) = fx.get(&format!("/{id}")).await?;
    assert_eq!(before, after);

    Ok(())
}

// ============================================================================
// Get
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_with_non_numeric_id(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, response) = fx.get("/abc").await?;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Employee ID must be a number");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_missing_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, response) = fx.get("/999").await?;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["success"], false);

    Ok(())
}

// ============================================================================
// List
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_filters_and_paginates(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let mut budi = employee_payload("EMP001", "budi@company.com");
    budi["department"] = json!("Engineering");
    let mut siti = employee_payload("EMP002", "siti@company.com");
    siti["name"] = json!("Siti Rahma");
    siti["department"] = json!("Engineering");
    let mut andi = employee_payload("EMP003", "andi@company.com");
    andi["name"] = json!("Andi");
    andi["department"] = json!("Finance");

    let budi_id = fx.seed(&budi).await?;
    let siti_id = fx.seed(&siti).await?;
    fx.seed(&andi).await?;

    // Act
    let (status, page) = fx.get("?department=Engineering&limit=1").await?;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["message"], "Employees retrieved successfully");
    assert_eq!(page["data"]["total"], 2);
    assert_eq!(page["data"]["limit"], 1);
    assert_eq!(page["data"]["offset"], 0);
    assert_eq!(ids(&page), vec![siti_id]);

    let (_, page) = fx.get("?department=Engineering&limit=1&offset=1").await?;
    assert_eq!(ids(&page), vec![budi_id]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_search_and_inactive_filter(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let budi_id = fx
        .seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;
    let mut siti = employee_payload("EMP002", "siti@company.com");
    siti["name"] = json!("Siti Rahma");
    let siti_id = fx.seed(&siti).await?;
    fx.delete(&format!("/{siti_id}")).await?;

    // Act
    let (_, search) = fx.get("?search=BUDI").await?;
    let (_, inactive) = fx.get("?is_active=false").await?;
    let (_, everyone) = fx.get("").await?;

    // Assert
    assert_eq!(ids(&search), vec![budi_id]);
    assert_eq!(ids(&inactive), vec![siti_id]);
    assert_eq!(everyone["data"]["total"], 2);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_rejects_bad_query_values(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    for query in ["?is_active=maybe", "?limit=ten", "?offset=-x"] {
        // Act
        let (status, response) = fx.get(query).await?;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(response["success"], false, "{query}");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_clamps_limit(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, page) = fx.get("?limit=1000").await?;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["limit"], 100);
    assert_eq!(page["data"]["total"], 0);
    assert_eq!(page["data"]["employees"], json!([]));

    Ok(())
}

// ============================================================================
// Update
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_partial_update_changes_only_given_fields(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let id = fx
        .seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;
    let (_, before) = fx.get(&format!("/{id}")).await?;

    // Act
    let (status, updated) = fx
        .put(&format!("/{id}"), &json!({ "position": "Lead Engineer", "salary": 0 }))
        .await?;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Employee updated successfully");
    assert_eq!(updated["data"]["position"], "Lead Engineer");
    assert_eq!(updated["data"]["salary"], 0.0);
    for field in ["nip", "name", "email", "phone", "department", "hire_date", "is_active", "created_at"] {
        assert_eq!(updated["data"][field], before["data"][field], "{field}");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_with_empty_body_is_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let id = fx
        .seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;

    // Act
    let (status, response) = fx.put(&format!("/{id}"), &json!({})).await?;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "No fields to update");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_to_taken_email_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    fx.seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;
    let siti_id = fx
        .seed(&employee_payload("EMP002", "siti@company.com"))
        .await?;

    // Act
    let (status, response) = fx
        .put(&format!("/{siti_id}"), &json!({ "email": "budi@company.com" }))
        .await?;

    // Assert
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        response["error"],
        "Another employee with this email already exists"
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_missing_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, _) = fx.put("/999", &json!({ "name": "Nobody" })).await?;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

// ============================================================================
// Delete
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_is_soft_and_idempotent(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;
    let id = fx
        .seed(&employee_payload("EMP001", "budi@company.com"))
        .await?;

    // Act
    let (first, body) = fx.delete(&format!("/{id}")).await?;
    let (second, _) = fx.delete(&format!("/{id}")).await?;

    // Assert
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["message"], "Employee deleted successfully");
    assert!(body.get("data").is_none());

    let (status, fetched) = fx.get(&format!("/{id}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["is_active"], false);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_missing_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let fx = Fixture::new(pool).await?;

    // Act
    let (status, response) = fx.delete("/999").await?;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        response["error"],
        "Employee with the specified ID does not exist"
    );

    Ok(())
}
