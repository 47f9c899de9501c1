//! HTTP routes and application state.

use crate::config::Config;
use crate::errors::ApiError;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_auth, AuthState};
use crate::services::auth_service;
use crate::services::token_service::TokenService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub token_service: Arc<TokenService>,
    /// Login fallback hash for unknown usernames, at `config.bcrypt_cost`.
    pub dummy_hash: String,
}

impl AppState {
    /// Build the state, hashing the login fallback at the configured cost.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Crypto` if the bcrypt cost is out of range.
    pub fn new(pool: PgPool, config: Config) -> Result<Self, ApiError> {
        let token_service = Arc::new(TokenService::new(
            config.jwt_secret_bytes(),
            config.jwt_expiry_seconds,
        ));
        let dummy_hash = auth_service::dummy_password_hash(config.bcrypt_cost)?;
        Ok(Self {
            pool,
            config,
            token_service,
            dummy_hash,
        })
    }
}

/// Build the application routes.
///
/// - `/health`, `/ready`, `/metrics` - public, unversioned
/// - `/api/v1/auth/login`, `/api/v1/auth/register` - public
/// - `/api/v1/auth/profile`, `/api/v1/employees[/:id]` - bearer token required
///
/// Every route gets permissive CORS, request tracing, a 30 second timeout
/// and HTTP metrics.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        token_service: state.token_service.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/register", post(handlers::register))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/auth/profile", get(handlers::profile))
        .route(
            "/api/v1/employees",
            post(handlers::create_employee).get(handlers::list_employees),
        )
        .route(
            "/api/v1/employees/:id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer - answers preflight requests before auth runs
    // 4. http_metrics_middleware (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
}
