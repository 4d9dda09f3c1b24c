// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{SessionService, TokenCodec};
use crate::config::SessionConfig;
use crate::storage::{InMemoryDirectory, InMemoryLedger, LedgerService, LedgerStore, UserDirectory};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SessionConfig>,
    pub sessions: Arc<SessionService>,
    pub ledger: Arc<LedgerService>,
}

impl AppState {
    pub fn new(
        config: SessionConfig,
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn LedgerStore>,
    ) -> Self {
        let codec = TokenCodec::new(&config);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionService::new(directory, codec)),
            ledger: Arc::new(LedgerService::new(store)),
        }
    }

    /// State backed by the seeded in-memory stores, configured from the
    /// environment. Also used as the fixture for router-level tests.
    pub fn seeded() -> Self {
        Self::new(
            SessionConfig::from_env(),
            Arc::new(InMemoryDirectory::seeded()),
            Arc::new(InMemoryLedger::seeded()),
        )
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::seeded()
    }
}
