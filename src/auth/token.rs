// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential codec: signing and verification of session tokens.
//!
//! Access and refresh tokens are compact HS256 JWTs signed with two
//! independent secrets, so compromise of one class never grants the other.
//! Issuance and verification are pure computations with no shared state.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::models::Role;

/// Claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Principal id, rendered as a string.
    pub sub: String,
    /// Role at issuance time. Guards reload the principal, so a stale role
    /// here only survives until the token expires.
    pub role: Role,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Claims embedded in a refresh token. Carries no role; the role is re-read
/// from the directory when a new access token is minted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The embedded expiry has passed (signature was otherwise acceptable)
    #[error("token has expired")]
    Expired,
    /// Signature mismatch, malformed token, or wrong secret
    #[error("token is invalid")]
    Invalid,
}

/// Signs and verifies session tokens with two independent secrets.
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Mint a signed access token for the given principal and role.
    pub fn issue_access(&self, subject_id: u64, role: Role) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: subject_id.to_string(),
            role,
            iat,
            exp: iat + self.access_ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Mint a signed refresh token for the given principal.
    pub fn issue_refresh(&self, subject_id: u64) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: subject_id.to_string(),
            iat,
            exp: iat + self.refresh_ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.access_decoding, &validation())
            .map(|data| data.claims)
            .map_err(map_error)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())
            .map(|data| data.claims)
            .map_err(map_error)
    }
}

/// Expiry is evaluated in absolute time with no clock-skew leeway.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    // Session tokens carry no audience claim.
    validation.validate_aud = false;
    validation
}

fn map_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}
