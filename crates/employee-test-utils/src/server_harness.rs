//! Test server harness for E2E testing
//!
//! Provides `TestApiServer` for spawning real employee API instances in tests.

use crate::fixtures::{test_config, TEST_BCRYPT_COST, TEST_PASSWORD};
use chrono::{Duration, Utc};
use common::secret::SecretString;
use employee_service::config::Config;
use employee_service::models::{RegisterRequest, UserInfo};
use employee_service::routes::{self, AppState};
use employee_service::services::auth_service;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the employee API in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_list_e2e(pool: PgPool) -> Result<()> {
///     let server = TestApiServer::spawn(pool).await?;
///     let (_, token) = server.create_user_with_token("alice").await?;
///
///     let response = reqwest::Client::new()
///         .get(format!("{}/api/v1/employees", server.url()))
///         .bearer_auth(&token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestApiServer {
    addr: SocketAddr,
    pool: PgPool,
    state: Arc<AppState>,
    _handle: JoinHandle<()>,
}

impl TestApiServer {
    /// Spawn a new test server bound to a random local port.
    ///
    /// # Arguments
    /// * `pool` - Database connection pool (typically from `#[sqlx::test]`)
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(pool, test_config()).await
    }

    /// Spawn with an explicit configuration, e.g. a short token lifetime.
    pub async fn spawn_with_config(pool: PgPool, config: Config) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(pool.clone(), config)?);

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            state,
            _handle: handle,
        })
    }

    /// Get reference to the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Register `username` directly through the service layer with
    /// `TEST_PASSWORD` and a derived email.
    pub async fn create_user(&self, username: &str) -> Result<UserInfo, anyhow::Error> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: format!("{}@company.com", username),
            password: SecretString::from(TEST_PASSWORD.to_string()),
        };

        let user = auth_service::register(&self.pool, TEST_BCRYPT_COST, request).await?;
        Ok(user)
    }

    /// Sign a token for `user` as of now.
    pub fn create_user_token(&self, user: &UserInfo) -> Result<String, anyhow::Error> {
        let (token, _) = self.state.token_service.issue(user, Utc::now())?;
        Ok(token)
    }

    /// Register `username` and sign a token for it.
    pub async fn create_user_with_token(
        &self,
        username: &str,
    ) -> Result<(UserInfo, String), anyhow::Error> {
        let user = self.create_user(username).await?;
        let token = self.create_user_token(&user)?;
        Ok((user, token))
    }

    /// Sign a token for `user` that expired `expired_seconds_ago`.
    pub fn create_expired_token(
        &self,
        user: &UserInfo,
        expired_seconds_ago: i64,
    ) -> Result<String, anyhow::Error> {
        let issued_at = Utc::now()
            - Duration::seconds(self.state.token_service.ttl_seconds())
            - Duration::seconds(expired_seconds_ago);
        let (token, _) = self.state.token_service.issue(user, issued_at)?;
        Ok(token)
    }

    /// Log in over HTTP and return the issued token.
    pub async fn login_token(&self, username: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}/api/v1/auth/login", self.url()))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Login failed with status {}", response.status());
        }

        let body: serde_json::Value = response.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Login response has no token"))
    }
}

impl Drop for TestApiServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
