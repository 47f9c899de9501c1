//! JWT utilities shared across services.
//!
//! - Size limit applied before any parsing
//! - Unverified header inspection (`alg`) so algorithm confusion is rejected
//!   before signature verification is attempted
//!
//! Nothing in this module verifies signatures. Callers must still verify the
//! token with their own key material.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens issued by this system are a few hundred bytes. Anything larger is
/// rejected before base64 decoding or HMAC computation.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// HMAC algorithms accepted for user tokens.
pub const HMAC_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Errors produced while inspecting a JWT header.
///
/// Messages are generic; details go to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtHeaderError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Not a three-part JWT, or the header is not base64url JSON.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Header has no string `alg` field.
    #[error("The access token is invalid or expired")]
    MissingAlgorithm,
}

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtHeaderError::TokenTooLarge` if the token is oversized.
pub fn check_token_size(token: &str) -> Result<(), JwtHeaderError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtHeaderError::TokenTooLarge);
    }
    Ok(())
}

/// Extract the `alg` header value without verifying the signature.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds the size limit
/// - `MalformedToken` if the token is not `header.payload.signature` or the
///   header cannot be decoded
/// - `MissingAlgorithm` if the header has no non-empty string `alg`
pub fn extract_alg(token: &str) -> Result<String, JwtHeaderError> {
    check_token_size(token)?;

    let mut parts = token.split('.');
    let header_part = parts.next().ok_or(JwtHeaderError::MalformedToken)?;
    if parts.count() != 2 {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtHeaderError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtHeaderError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtHeaderError::MalformedToken
    })?;

    header
        .get("alg")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtHeaderError::MissingAlgorithm)
}

/// Whether `alg` names one of the [`HMAC_ALGORITHMS`].
#[must_use]
pub fn is_hmac_algorithm(alg: &str) -> bool {
    HMAC_ALGORITHMS.contains(&alg)
}
