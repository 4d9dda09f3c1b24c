// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger store and the transaction applier.
//!
//! The store owns beneficiary balances, partner store records, and the
//! append-only transaction log behind a narrow trait. [`LedgerService`] is the
//! only writer: it serializes balance mutation per beneficiary so that two
//! concurrent debits can never both pass the sufficient-balance check on a
//! stale read. Debits for different beneficiaries proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, RwLock};

use tokio::sync::Mutex;

use crate::models::{Beneficiary, Product, StoreRecord, TransactionRecord};

/// Ledger access interface consumed by the transaction applier and handlers.
pub trait LedgerStore: Send + Sync {
    fn find_beneficiary_by_qr(&self, qr_code: &str) -> Option<Beneficiary>;
    fn list_beneficiaries(&self) -> Vec<Beneficiary>;
    fn find_store_by_qr(&self, qr_code: &str) -> Option<StoreRecord>;
    fn list_stores(&self) -> Vec<StoreRecord>;
    /// Set a beneficiary's balance. Returns whether the beneficiary exists.
    fn update_balance(&self, beneficiary_id: &str, new_balance: u64) -> bool;
    fn append_transaction(&self, record: TransactionRecord);
    /// Records touching the given QR code, or the whole log if `None`.
    fn list_transactions(&self, qr_code: Option<&str>) -> Vec<TransactionRecord>;
}

/// Ledger operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Beneficiary not found")]
    BeneficiaryNotFound,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Amount must be a positive number of points")]
    InvalidAmount,
    #[error("Balance must be a non-negative number")]
    InvalidBalance,
}

// =============================================================================
// In-memory store
// =============================================================================

/// In-memory ledger standing in for a real database.
#[derive(Default)]
pub struct InMemoryLedger {
    beneficiaries: RwLock<Vec<Beneficiary>>,
    stores: RwLock<Vec<StoreRecord>>,
    transactions: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger populated with the development seed records.
    pub fn seeded() -> Self {
        let ledger = Self::new();

        ledger.insert_beneficiary(Beneficiary {
            id: "A123456789".to_string(),
            name: "Chang Ming".to_string(),
            id_number: "A123456789".to_string(),
            qr_code: "QR_001".to_string(),
            balance: 150,
            phone: "0912-345-678".to_string(),
        });
        ledger.insert_beneficiary(Beneficiary {
            id: "B234567890".to_string(),
            name: "Lee Hua".to_string(),
            id_number: "B234567890".to_string(),
            qr_code: "QR_002".to_string(),
            balance: 200,
            phone: "0923-456-789".to_string(),
        });

        ledger.insert_store(StoreRecord {
            id: "STORE_001".to_string(),
            name: "ABC Diner".to_string(),
            qr_code: "STORE_QR_001".to_string(),
            address: "123 Heping E. Rd, Daan District, Taipei".to_string(),
            phone: "02-2345-6789".to_string(),
            products: vec![
                Product {
                    id: 1,
                    name: "Lunch set".to_string(),
                    points: 80,
                    description: "Main dish, soup and a drink".to_string(),
                },
                Product {
                    id: 2,
                    name: "Breakfast combo".to_string(),
                    points: 50,
                    description: "Sandwich and coffee".to_string(),
                },
                Product {
                    id: 3,
                    name: "Dinner set".to_string(),
                    points: 100,
                    description: "Two mains, soup, drink and dessert".to_string(),
                },
                Product {
                    id: 4,
                    name: "Drink".to_string(),
                    points: 20,
                    description: "Any single drink".to_string(),
                },
            ],
        });
        ledger.insert_store(StoreRecord {
            id: "STORE_002".to_string(),
            name: "XYZ Laundry".to_string(),
            qr_code: "STORE_QR_002".to_string(),
            address: "456 Roosevelt Rd, Zhongzheng District, Taipei".to_string(),
            phone: "02-3456-7890".to_string(),
            products: vec![
                Product {
                    id: 1,
                    name: "Laundry voucher".to_string(),
                    points: 50,
                    description: "Regular clothing wash".to_string(),
                },
                Product {
                    id: 2,
                    name: "Ironing service".to_string(),
                    points: 30,
                    description: "Single garment".to_string(),
                },
            ],
        });

        ledger
    }

    pub fn insert_beneficiary(&self, beneficiary: Beneficiary) {
        self.beneficiaries
            .write()
            .expect("ledger lock poisoned")
            .push(beneficiary);
    }

    pub fn insert_store(&self, store: StoreRecord) {
        self.stores
            .write()
            .expect("ledger lock poisoned")
            .push(store);
    }
}

impl LedgerStore for InMemoryLedger {
    fn find_beneficiary_by_qr(&self, qr_code: &str) -> Option<Beneficiary> {
        let beneficiaries = self.beneficiaries.read().expect("ledger lock poisoned");
        beneficiaries.iter().find(|b| b.qr_code == qr_code).cloned()
    }

    fn list_beneficiaries(&self) -> Vec<Beneficiary> {
        self.beneficiaries
            .read()
            .expect("ledger lock poisoned")
            .clone()
    }

    fn find_store_by_qr(&self, qr_code: &str) -> Option<StoreRecord> {
        let stores = self.stores.read().expect("ledger lock poisoned");
        stores.iter().find(|s| s.qr_code == qr_code).cloned()
    }

    fn list_stores(&self) -> Vec<StoreRecord> {
        self.stores.read().expect("ledger lock poisoned").clone()
    }

    fn update_balance(&self, beneficiary_id: &str, new_balance: u64) -> bool {
        let mut beneficiaries = self.beneficiaries.write().expect("ledger lock poisoned");
        match beneficiaries.iter_mut().find(|b| b.id == beneficiary_id) {
            Some(beneficiary) => {
                beneficiary.balance = new_balance;
                true
            }
            None => false,
        }
    }

    fn append_transaction(&self, record: TransactionRecord) {
        self.transactions
            .write()
            .expect("ledger lock poisoned")
            .push(record);
    }

    fn list_transactions(&self, qr_code: Option<&str>) -> Vec<TransactionRecord> {
        let transactions = self.transactions.read().expect("ledger lock poisoned");
        match qr_code {
            Some(qr) => transactions.iter().filter(|t| t.touches(qr)).cloned().collect(),
            None => transactions.clone(),
        }
    }
}

// =============================================================================
// Transaction applier
// =============================================================================

/// Applies balance mutations atomically per beneficiary.
///
/// Holds one async mutex per beneficiary id; the check-then-act window of a
/// debit runs entirely under that lock. The registry only ever grows, bounded
/// by the beneficiary population.
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    account_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            account_locks: StdMutex::new(HashMap::new()),
        }
    }

    fn account_lock(&self, beneficiary_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock().expect("lock registry poisoned");
        locks
            .entry(beneficiary_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Debit a beneficiary's balance and append the transaction record.
    ///
    /// The balance is re-read under the per-beneficiary lock, so concurrent
    /// debits observe each other's writes. A rejected debit mutates nothing
    /// and leaves no record.
    pub async fn debit(
        &self,
        beneficiary_qr_code: &str,
        amount: i64,
        store_qr_code: Option<String>,
        product_name: Option<String>,
    ) -> Result<(TransactionRecord, u64), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let amount = amount as u64;

        let beneficiary = self
            .store
            .find_beneficiary_by_qr(beneficiary_qr_code)
            .ok_or(LedgerError::BeneficiaryNotFound)?;

        let lock = self.account_lock(&beneficiary.id);
        let _guard = lock.lock().await;

        // The balance may have moved between the lookup and the lock.
        let beneficiary = self
            .store
            .find_beneficiary_by_qr(beneficiary_qr_code)
            .ok_or(LedgerError::BeneficiaryNotFound)?;

        if beneficiary.balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        let new_balance = beneficiary.balance - amount;
        self.store.update_balance(&beneficiary.id, new_balance);

        let record = TransactionRecord::completed(
            beneficiary_qr_code,
            store_qr_code,
            amount,
            product_name,
        );
        self.store.append_transaction(record.clone());

        tracing::info!(
            beneficiary = beneficiary_qr_code,
            amount,
            new_balance,
            "debit completed"
        );

        Ok((record, new_balance))
    }

    /// Set a beneficiary's balance outright (NGO top-up).
    ///
    /// Takes the same per-beneficiary lock as [`LedgerService::debit`], so a
    /// top-up cannot interleave with a debit's check-then-act window.
    pub async fn set_balance(
        &self,
        beneficiary_qr_code: &str,
        new_balance: i64,
    ) -> Result<u64, LedgerError> {
        if new_balance < 0 {
            return Err(LedgerError::InvalidBalance);
        }

        let beneficiary = self
            .store
            .find_beneficiary_by_qr(beneficiary_qr_code)
            .ok_or(LedgerError::BeneficiaryNotFound)?;

        let lock = self.account_lock(&beneficiary.id);
        let _guard = lock.lock().await;

        if !self.store.update_balance(&beneficiary.id, new_balance as u64) {
            return Err(LedgerError::BeneficiaryNotFound);
        }

        Ok(new_balance as u64)
    }

    // Read-only pass-throughs for handlers.

    pub fn beneficiary_by_qr(&self, qr_code: &str) -> Option<Beneficiary> {
        self.store.find_beneficiary_by_qr(qr_code)
    }

    pub fn beneficiaries(&self) -> Vec<Beneficiary> {
        self.store.list_beneficiaries()
    }

    pub fn store_by_qr(&self, qr_code: &str) -> Option<StoreRecord> {
        self.store.find_store_by_qr(qr_code)
    }

    pub fn stores(&self) -> Vec<StoreRecord> {
        self.store.list_stores()
    }

    pub fn transactions(&self, qr_code: Option<&str>) -> Vec<TransactionRecord> {
        self.store.list_transactions(qr_code)
    }
}
