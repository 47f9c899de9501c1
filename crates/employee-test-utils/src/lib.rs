//! # Employee Test Utilities
//!
//! Shared test utilities for the employee records service.
//!
//! This crate provides:
//! - Fixed test configuration (secret, bcrypt cost)
//! - Request payload builders
//! - Server test harness (`TestApiServer` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use employee_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> anyhow::Result<()> {
//!     let server = TestApiServer::spawn(pool).await?;
//!     let token = server.login_token("alice", "secret123").await?;
//!
//!     token.assert_valid_jwt().assert_for_user("alice");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;

pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
