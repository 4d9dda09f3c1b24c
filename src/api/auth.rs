// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: login, logout, refresh, and current user.
//!
//! These handlers are the only place cookies are written; everything else in
//! the auth flow happens in [`crate::auth::SessionService`].

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::cookies::{
    access_cookie, clear_access_cookie, clear_refresh_cookie, read_token, refresh_cookie,
    REFRESH_COOKIE,
};
use crate::auth::{Auth, AuthError};
use crate::models::PublicProfile;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Login credentials plus the role the client claims to sign in as.
///
/// Fields are optional so that missing and empty values fail identically with
/// a 400 rather than a body-rejection error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response carrying the session's public profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: PublicProfile,
}

/// Response with no payload beyond the envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Authenticate and establish the cookie session.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; both session cookies set", body = SessionResponse),
        (status = 400, description = "Missing username, password, or role"),
        (status = 401, description = "Invalid credentials or role mismatch"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AuthError> {
    let (profile, tokens) = state.sessions.login(
        body.username.as_deref().unwrap_or(""),
        body.password.as_deref().unwrap_or(""),
        body.role.as_deref().unwrap_or(""),
    )?;

    let config = &state.config;
    let jar = jar
        .add(access_cookie(
            &tokens.access,
            config.access_ttl_secs,
            config.secure_cookies,
        ))
        .add(refresh_cookie(
            &tokens.refresh,
            config.refresh_ttl_secs,
            config.secure_cookies,
        ));

    tracing::info!(username = %profile.username, role = %profile.role, "principal logged in");

    Ok((
        jar,
        Json(SessionResponse {
            success: true,
            message: Some("Login successful".to_string()),
            user: profile,
        }),
    ))
}

/// End the session by clearing both cookies.
///
/// There is no server-side session state to tear down, so logout always
/// succeeds and is idempotent.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Both session cookies cleared", body = MessageResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let secure = state.config.secure_cookies;
    let jar = jar
        .add(clear_access_cookie(secure))
        .add(clear_refresh_cookie(secure));

    (
        jar,
        Json(MessageResponse {
            success: true,
            message: "Logout successful".to_string(),
        }),
    )
}

/// Mint a fresh access token from the refresh cookie.
///
/// An expired refresh token ends the session: both cookies are cleared and
/// the client must log in again. Any other verification failure leaves the
/// cookies untouched.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "New access cookie set", body = MessageResponse),
        (status = 401, description = "Refresh cookie missing or expired (expiry clears both cookies)"),
        (status = 403, description = "Refresh token invalid"),
    )
)]
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = read_token(&jar, REFRESH_COOKIE);
    let config = &state.config;

    match state.sessions.refresh(token.as_deref()) {
        Ok(access) => {
            let jar = jar.add(access_cookie(
                &access,
                config.access_ttl_secs,
                config.secure_cookies,
            ));
            (
                jar,
                Json(MessageResponse {
                    success: true,
                    message: "Token refreshed".to_string(),
                }),
            )
                .into_response()
        }
        Err(err @ AuthError::RefreshExpired) => {
            // The session is over; strip both cookies alongside the error.
            let jar = jar
                .add(clear_access_cookie(config.secure_cookies))
                .add(clear_refresh_cookie(config.secure_cookies));
            (jar, err).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Return the current session's profile, freshly loaded.
///
/// Served at both `/auth/me` and `/auth/verify`; clients poll the latter on
/// startup to restore a session.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session profile", body = SessionResponse),
        (status = 401, description = "No session, expired session (`expired: true`), or principal deleted"),
        (status = 403, description = "Token invalid"),
    )
)]
pub async fn me(Auth(profile): Auth) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        message: None,
        user: profile,
    })
}
