// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cookie-based session authentication for the voucher ledger API.
//!
//! ## Session Flow
//!
//! 1. Client POSTs username, password, and claimed role to `/auth/login`
//! 2. The session service verifies the credentials against the user directory
//!    and mints two HS256 tokens with independent secrets:
//!    - access token (15 min) carrying `{sub, role}`
//!    - refresh token (7 days) carrying `{sub}`
//! 3. Both tokens travel as `HttpOnly` cookies; the browser replays them on
//!    every request
//! 4. Guards verify the access cookie and reload the principal on each
//!    protected request
//! 5. When the access token expires, clients silently POST `/auth/refresh`
//!    (the `expired: true` response flag tells them to); an expired refresh
//!    token forces a full re-login with both cookies cleared
//!
//! ## Security
//!
//! - The three login failure causes share one error shape (enumeration
//!   resistance)
//! - Access and refresh secrets are independent; neither token verifies as
//!   the other class
//! - Expiry is checked in absolute time with no clock-skew leeway
//! - Tokens are never persisted server-side

pub mod cookies;
pub mod error;
pub mod extractor;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use extractor::{Auth, NgoStaff, OptionalAuth};
pub use session::{SessionService, TokenPair};
pub use token::TokenCodec;
