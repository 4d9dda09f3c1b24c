// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage layer: the injected collaborators behind the auth core and ledger.
//!
//! Each store is a narrow trait plus an in-memory implementation seeded at
//! startup; the rest of the service depends only on the traits and the
//! per-beneficiary atomicity provided by [`LedgerService`].

pub mod directory;
pub mod ledger;

pub use directory::{InMemoryDirectory, UserDirectory};
pub use ledger::{InMemoryLedger, LedgerError, LedgerService, LedgerStore};
