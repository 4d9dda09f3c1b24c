// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication failure taxonomy.
//!
//! Every session-related failure in the system maps to exactly one of these
//! variants. The three login failure causes (unknown username, claimed role
//! mismatch, wrong password) intentionally share [`AuthError::InvalidCredentials`]
//! so callers cannot probe which check failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Login request is missing username, password, or role
    #[error("Username, password and role are required")]
    MissingCredentials,
    /// Unknown username, role mismatch, or wrong password (indistinguishable)
    #[error("Invalid username or password")]
    InvalidCredentials,
    /// No token cookie was presented
    #[error("No authentication token provided")]
    MissingToken,
    /// Access token parsed but its expiry has passed
    #[error("Access token has expired")]
    SessionExpired,
    /// Refresh token parsed but its expiry has passed; the session is over
    #[error("Refresh token has expired, please log in again")]
    RefreshExpired,
    /// Signature mismatch, malformed token, or wrong secret
    #[error("Invalid token")]
    TokenInvalid,
    /// Token verified but the subject no longer exists
    #[error("Account no longer exists")]
    PrincipalNotFound,
    /// Authenticated, but the role is not permitted
    #[error("Insufficient permissions")]
    Forbidden,
    /// Credential issuance failed
    #[error("Internal authentication error")]
    Internal,
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<bool>,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::SessionExpired
            | AuthError::RefreshExpired
            | AuthError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AuthError::TokenInvalid | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this failure should carry the `expired: true` flag.
    ///
    /// The flag tells clients to attempt a silent refresh instead of forcing
    /// a full re-login, so it is set only for an expired access token.
    pub fn is_expired_session(&self) -> bool {
        matches!(self, AuthError::SessionExpired)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            success: false,
            message: self.to_string(),
            expired: self.is_expired_session().then_some(true),
        });
        (status, body).into_response()
    }
}
