//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the workspace for passwords,
//! signing secrets and database credentials. Any struct deriving `Debug` that
//! holds a `SecretString` prints `[REDACTED]` instead of the value, and the
//! value is zeroized on drop.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct Credentials {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let creds = Credentials {
//!     username: "admin".to_string(),
//!     password: SecretString::from("admin123"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("admin123"));
//! assert_eq!(creds.password.expose_secret(), "admin123");
//! ```
//!
//! Use `SecretString` for user passwords, JWT signing secrets and connection
//! strings carrying credentials.

pub use secrecy::{ExposeSecret, SecretString};
