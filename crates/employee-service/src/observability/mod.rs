//! Observability for the employee service.
//!
//! Handlers and services use `#[instrument(skip_all)]` and list safe fields
//! explicitly. Passwords, password hashes, tokens and the signing secret never
//! appear in logs or metric labels.

pub mod metrics;
