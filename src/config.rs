// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_ACCESS_SECRET` | Signing secret for access tokens | dev placeholder |
//! | `JWT_REFRESH_SECRET` | Signing secret for refresh tokens | dev placeholder |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime in seconds | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime in seconds | `604800` |
//! | `APP_ENV` | `production` enables `Secure` cookies | unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RUST_LOG` | Log level filter | unset |

use std::env;

/// Environment variable name for the access token signing secret.
pub const JWT_ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";

/// Environment variable name for the refresh token signing secret.
///
/// Must differ from the access secret so that a leaked access secret does not
/// grant refresh capability, and vice versa.
pub const JWT_REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";

/// Environment variable name for the access token lifetime (seconds).
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";

/// Environment variable name for the refresh token lifetime (seconds).
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";

/// Environment variable selecting the deployment environment.
pub const APP_ENV_VAR: &str = "APP_ENV";

/// Access token lifetime default: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

/// Refresh token lifetime default: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;

/// Session configuration: token secrets, lifetimes, and cookie hardening.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret for signing and verifying access tokens.
    pub access_secret: String,
    /// Secret for signing and verifying refresh tokens.
    pub refresh_secret: String,
    /// Access token (and cookie) lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token (and cookie) lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl SessionConfig {
    /// Load the session configuration from the environment.
    ///
    /// Missing variables fall back to development defaults; a production
    /// deployment must set both secrets.
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var(JWT_ACCESS_SECRET_ENV)
                .unwrap_or_else(|_| "dev-access-secret".to_string()),
            refresh_secret: env::var(JWT_REFRESH_SECRET_ENV)
                .unwrap_or_else(|_| "dev-refresh-secret".to_string()),
            access_ttl_secs: ttl_from_env(ACCESS_TOKEN_TTL_ENV, DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: ttl_from_env(REFRESH_TOKEN_TTL_ENV, DEFAULT_REFRESH_TTL_SECS),
            secure_cookies: env::var(APP_ENV_VAR)
                .map(|v| is_production(&v))
                .unwrap_or(false),
        }
    }
}

impl Default for SessionConfig {
    /// Development defaults, also used by tests.
    fn default() -> Self {
        Self {
            access_secret: "dev-access-secret".to_string(),
            refresh_secret: "dev-refresh-secret".to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            secure_cookies: false,
        }
    }
}

/// Parse a TTL variable, falling back to the default on absence or garbage.
fn ttl_from_env(var: &str, default: i64) -> i64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

/// Whether an `APP_ENV` value selects production hardening.
fn is_production(value: &str) -> bool {
    value.eq_ignore_ascii_case("production")
}
