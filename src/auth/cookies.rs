// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie adapter.
//!
//! The session's entire wire contract is two `HttpOnly` cookies. Both are
//! scoped to `/`, `SameSite=Lax`, and `Secure` in production. Clearing a
//! cookie reissues it empty with `Max-Age=0`. Reading a missing cookie is not
//! an error at this layer; callers receive `None`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie carrying the short-lived access token.
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie carrying the long-lived refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(name: &str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Build the access token cookie.
pub fn access_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, token.to_string(), max_age_secs, secure)
}

/// Build the refresh token cookie.
pub fn refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, token.to_string(), max_age_secs, secure)
}

/// Build an expired cookie that clears the access token.
pub fn clear_access_cookie(secure: bool) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, String::new(), 0, secure)
}

/// Build an expired cookie that clears the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, String::new(), 0, secure)
}

/// Read a token value from the request's cookie jar.
pub fn read_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|cookie| cookie.value().to_string())
}
