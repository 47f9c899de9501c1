//! Custom test assertions for issued tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub user_id: i32,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

fn decode_claims(token: &str) -> JwtClaims {
    let payload = token.split('.').nth(1).expect("JWT has no payload segment");
    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .expect("Invalid JWT payload");
    serde_json::from_slice(&payload).expect("Failed to parse JWT claims")
}

/// Custom assertions for bearer tokens returned by login.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_user("alice")
///     .assert_expires_in(86400);
/// ```
pub trait TokenAssertions {
    /// Assert the token is a three-part HS256 JWT with decodable claims.
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the token names `username`.
    fn assert_for_user(&self, username: &str) -> &Self;

    /// Assert the token carries `user_id`.
    fn assert_user_id(&self, user_id: i32) -> &Self;

    /// Assert the token expires `seconds` from now, within a few seconds.
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = URL_SAFE_NO_PAD
            .decode(parts[0])
            .expect("Failed to base64 decode JWT header");
        let header: JwtHeader =
            serde_json::from_slice(&header).expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");

        let claims = decode_claims(self);
        assert!(claims.iat <= claims.exp, "iat must not be after exp");

        self
    }

    fn assert_for_user(&self, username: &str) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.username, username,
            "Expected username '{}', got '{}'",
            username, claims.username
        );
        self
    }

    fn assert_user_id(&self, user_id: i32) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(claims.user_id, user_id, "Unexpected user_id claim");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = decode_claims(self);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );
        self
    }
}
