// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require a valid session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(profile): Auth) -> impl IntoResponse {
//!     // profile is the freshly loaded PublicProfile
//! }
//! ```
//!
//! Role checks always run on an already-resolved profile, so a role check
//! against an absent principal cannot be expressed.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::models::{PublicProfile, Role};
use crate::state::AppState;

use super::cookies::{self, ACCESS_COOKIE};
use super::error::AuthError;

/// Roles allowed to read the full beneficiary and store registries.
pub const NGO_STAFF_ROLES: &[Role] = &[Role::NgoAdmin, Role::NgoPartner];

/// Roles allowed to post debits against a beneficiary balance.
pub const DEBIT_ROLES: &[Role] = &[Role::Store, Role::NgoAdmin, Role::NgoPartner];

/// Require the given profile to hold one of the allowed roles.
pub fn require_role(profile: &PublicProfile, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&profile.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Extractor requiring a valid session.
///
/// Reads the access cookie, verifies it, and reloads the principal from the
/// directory; failures short-circuit the handler with the auth core's error
/// unchanged (including the `expired` flag on an expired access token).
pub struct Auth(pub PublicProfile);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::read_token(&jar, ACCESS_COOKIE);
        let profile = state.sessions.current_user(token.as_deref())?;
        Ok(Auth(profile))
    }
}

/// Extractor requiring an NGO staff session.
pub struct NgoStaff(pub PublicProfile);

impl FromRequestParts<AppState> for NgoStaff {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(profile) = Auth::from_request_parts(parts, state).await?;
        require_role(&profile, NGO_STAFF_ROLES)?;
        Ok(NgoStaff(profile))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting when no usable session is present. Only
/// for endpoints that behave differently for guests and known principals but
/// do not require authentication.
pub struct OptionalAuth(pub Option<PublicProfile>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::read_token(&jar, ACCESS_COOKIE);
        Ok(OptionalAuth(state.sessions.optional_session(token.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn test_state() -> AppState {
        AppState::seeded()
    }

    fn parts_with_cookie(cookie: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn access_cookie_for(state: &AppState, username: &str, password: &str, role: &str) -> String {
        let (_, tokens) = state.sessions.login(username, password, role).unwrap();
        format!("{ACCESS_COOKIE}={}", tokens.access)
    }

    #[tokio::test]
    async fn auth_requires_cookie() {
        let state = test_state();
        let mut parts = parts_with_cookie(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn auth_resolves_profile_from_cookie() {
        let state = test_state();
        let cookie = access_cookie_for(&state, "store1", "store123", "store");
        let mut parts = parts_with_cookie(Some(cookie));

        let Auth(profile) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(profile.username, "store1");
        assert_eq!(profile.role, Role::Store);
    }

    #[tokio::test]
    async fn auth_rejects_garbage_cookie() {
        let state = test_state();
        let mut parts = parts_with_cookie(Some(format!("{ACCESS_COOKIE}=garbage")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn ngo_staff_rejects_store_session() {
        let state = test_state();
        let cookie = access_cookie_for(&state, "store1", "store123", "store");
        let mut parts = parts_with_cookie(Some(cookie));

        let result = NgoStaff::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::Forbidden)));
    }

    #[tokio::test]
    async fn ngo_staff_accepts_admin_session() {
        let state = test_state();
        let cookie = access_cookie_for(&state, "admin", "admin123", "ngo_admin");
        let mut parts = parts_with_cookie(Some(cookie));

        let NgoStaff(profile) = NgoStaff::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(profile.role, Role::NgoAdmin);
    }

    #[tokio::test]
    async fn optional_auth_never_rejects() {
        let state = test_state();

        let mut parts = parts_with_cookie(None);
        let OptionalAuth(none) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());

        let mut parts = parts_with_cookie(Some(format!("{ACCESS_COOKIE}=garbage")));
        let OptionalAuth(none) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn require_role_checks_membership() {
        let state = test_state();
        let (profile, _) = state.sessions.login("store1", "store123", "store").unwrap();

        assert!(require_role(&profile, DEBIT_ROLES).is_ok());
        assert_eq!(
            require_role(&profile, NGO_STAFF_ROLES).unwrap_err(),
            AuthError::Forbidden
        );
    }
}
