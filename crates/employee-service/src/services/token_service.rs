//! User token issuance and validation (HS256 JWT).
//!
//! Tokens are stateless: there is no revocation list, a token stays valid
//! until `exp`.

use crate::errors::ApiError;
use crate::models::UserInfo;
use chrono::{DateTime, Utc};
use common::jwt::{self, JwtHeaderError};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Why a token was rejected. Never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    MalformedToken,
    SignatureInvalid,
    AlgorithmMismatch,
    Expired,
    NotYetValid,
    ClaimMissing(&'static str),
}

impl TokenError {
    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::AlgorithmMismatch => "algorithm_mismatch",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
            TokenError::ClaimMissing(_) => "claim_missing",
        }
    }
}

impl From<JwtHeaderError> for TokenError {
    fn from(err: JwtHeaderError) -> Self {
        match err {
            JwtHeaderError::TokenTooLarge | JwtHeaderError::MalformedToken => {
                TokenError::MalformedToken
            }
            JwtHeaderError::MissingAlgorithm => TokenError::AlgorithmMismatch,
        }
    }
}

/// Identity carried by a validated token.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Custom Debug implementation that redacts the email address.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Signs and verifies user tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `user`, valid from `now` for the configured TTL.
    ///
    /// Returns the encoded token and its expiry instant.
    pub fn issue(
        &self,
        user: &UserInfo,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), ApiError> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl_seconds)
            .ok_or_else(|| ApiError::Crypto("Token expiry overflow".to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| ApiError::Crypto("Token expiry out of range".to_string()))?;

        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Crypto(format!("Token signing failed: {}", e)))?;

        Ok((token, expires_at))
    }

    /// Validate `token` at instant `now`.
    ///
    /// Checks run in order: size, header algorithm, signature, claim shape,
    /// then `iat <= now < exp`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let alg = jwt::extract_alg(token)?;
        if !jwt::is_hmac_algorithm(&alg) {
            tracing::debug!(target: "employee.auth", alg = %alg, "Token rejected: algorithm not allowed");
            return Err(TokenError::AlgorithmMismatch);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let token_data = jsonwebtoken::decode::<Value>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
                _ => {
                    tracing::debug!(target: "employee.auth", error = %e, "Token rejected: decode failed");
                    TokenError::MalformedToken
                }
            })?;

        let claims = extract_claims(&token_data.claims)?;

        let now = now.timestamp();
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.iat > now {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }
}

fn extract_claims(value: &Value) -> Result<Claims, TokenError> {
    let user_id = value
        .get("user_id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or(TokenError::ClaimMissing("user_id"))?;

    Ok(Claims {
        user_id,
        username: string_claim(value, "username")?,
        email: string_claim(value, "email")?,
        iat: int_claim(value, "iat")?,
        exp: int_claim(value, "exp")?,
    })
}

fn string_claim(value: &Value, name: &'static str) -> Result<String, TokenError> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(TokenError::ClaimMissing(name))
}

fn int_claim(value: &Value, name: &'static str) -> Result<i64, TokenError> {
    value
        .get(name)
        .and_then(Value::as_i64)
        .ok_or(TokenError::ClaimMissing(name))
}
