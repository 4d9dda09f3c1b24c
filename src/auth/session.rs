// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state machine: credential issuance, verification, and renewal.
//!
//! Each operation corresponds to one edge of the session lifecycle:
//!
//! 1. `login`: credentials in, access + refresh tokens out
//! 2. `current_user`: access token in, freshly loaded profile out
//! 3. `refresh`: valid refresh token in, new access token out (the refresh
//!    token itself is not rotated)
//! 4. logout has no server-side state; the boundary just clears cookies
//!
//! Tokens are stateless: nothing is stored per session, and verification
//! always reloads the principal so profile and role edits made after issuance
//! are reflected immediately.

use std::sync::Arc;

use crate::models::{PublicProfile, Role};
use crate::storage::UserDirectory;

use super::error::AuthError;
use super::token::{TokenCodec, TokenError};

/// The credential pair minted at login.
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Orchestrates login, verification, and renewal against the user directory.
pub struct SessionService {
    directory: Arc<dyn UserDirectory>,
    codec: TokenCodec,
}

impl SessionService {
    pub fn new(directory: Arc<dyn UserDirectory>, codec: TokenCodec) -> Self {
        Self { directory, codec }
    }

    /// Authenticate with username, password, and the role the client claims
    /// to be logging in as.
    ///
    /// Unknown username, claimed-role mismatch, and wrong password all fail
    /// with the same [`AuthError::InvalidCredentials`]; callers cannot learn
    /// which check failed.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        claimed_role: &str,
    ) -> Result<(PublicProfile, TokenPair), AuthError> {
        if username.is_empty() || password.is_empty() || claimed_role.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(principal) = self.directory.find_by_username(username) else {
            tracing::debug!(username, "login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if Role::from_str(claimed_role) != Some(principal.role) {
            tracing::debug!(username, "login rejected: role mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !bcrypt::verify(password, &principal.password_hash).unwrap_or(false) {
            tracing::debug!(username, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let access = self
            .codec
            .issue_access(principal.id, principal.role)
            .map_err(|_| AuthError::Internal)?;
        let refresh = self
            .codec
            .issue_refresh(principal.id)
            .map_err(|_| AuthError::Internal)?;

        Ok((principal.public_profile(), TokenPair { access, refresh }))
    }

    /// Mint a fresh access token from a refresh token.
    ///
    /// The principal is re-read from the directory, so the new access token
    /// embeds the current stored role rather than the role at login time.
    /// An expired refresh token ends the session ([`AuthError::RefreshExpired`],
    /// the boundary clears both cookies); any other verification failure is
    /// [`AuthError::TokenInvalid`] and leaves cookies untouched.
    pub fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError> {
        let token = refresh_token.ok_or(AuthError::MissingToken)?;

        let claims = self.codec.verify_refresh(token).map_err(|err| match err {
            TokenError::Expired => AuthError::RefreshExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
        })?;

        let principal = self
            .directory
            .find_by_id(parse_subject(&claims.sub)?)
            .ok_or(AuthError::PrincipalNotFound)?;

        self.codec
            .issue_access(principal.id, principal.role)
            .map_err(|_| AuthError::Internal)
    }

    /// Resolve the principal behind an access token.
    ///
    /// The profile is loaded fresh from the directory rather than echoed from
    /// the token's claims. An expired token fails with
    /// [`AuthError::SessionExpired`], which is surfaced to clients as
    /// `expired: true` so they can attempt a silent refresh.
    pub fn current_user(&self, access_token: Option<&str>) -> Result<PublicProfile, AuthError> {
        let token = access_token.ok_or(AuthError::MissingToken)?;

        let claims = self.codec.verify_access(token).map_err(|err| match err {
            TokenError::Expired => AuthError::SessionExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
        })?;

        let principal = self
            .directory
            .find_by_id(parse_subject(&claims.sub)?)
            .ok_or(AuthError::PrincipalNotFound)?;

        Ok(principal.public_profile())
    }

    /// Like [`SessionService::current_user`], but never fails: an absent or
    /// unusable token yields no principal.
    pub fn optional_session(&self, access_token: Option<&str>) -> Option<PublicProfile> {
        self.current_user(access_token).ok()
    }
}

/// A subject claim that does not parse as a principal id is a forged or
/// foreign token, not a missing principal.
fn parse_subject(sub: &str) -> Result<u64, AuthError> {
    sub.parse().map_err(|_| AuthError::TokenInvalid)
}
