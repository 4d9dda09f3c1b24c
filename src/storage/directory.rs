// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory: principal lookup for the auth core.
//!
//! The auth core only ever needs two queries, so the directory is injected
//! behind a narrow trait and the in-memory implementation stands in for a
//! real user database.

use std::sync::RwLock;

use crate::models::{Principal, Role};

/// Lookup interface consumed by the auth core and guards.
pub trait UserDirectory: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<Principal>;
    fn find_by_id(&self, id: u64) -> Option<Principal>;
}

/// In-memory directory seeded at startup.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<Principal>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory populated with the development seed accounts.
    ///
    /// Hashing happens here rather than in the literals so the seed source
    /// never contains a stale hash.
    pub fn seeded() -> Self {
        let directory = Self::new();

        let mut admin = Principal::new(
            1,
            "admin",
            seed_hash("admin123"),
            Role::NgoAdmin,
            "NGO Administrator",
        );
        admin.email = Some("admin@ngo.org".to_string());
        directory.insert(admin);

        let mut store = Principal::new(2, "store1", seed_hash("store123"), Role::Store, "ABC Diner");
        store.store_id = Some("STORE_001".to_string());
        store.qr_code = Some("STORE_QR_001".to_string());
        store.address = Some("123 Heping E. Rd, Daan District, Taipei".to_string());
        store.phone = Some("02-2345-6789".to_string());
        directory.insert(store);

        let mut beneficiary = Principal::new(
            3,
            "homeless1",
            seed_hash("homeless123"),
            Role::Homeless,
            "Chang Ming",
        );
        beneficiary.id_number = Some("A123456789".to_string());
        beneficiary.qr_code = Some("QR_001".to_string());
        beneficiary.balance = Some(150);
        directory.insert(beneficiary);

        let mut partner = Principal::new(
            4,
            "ngo_partner",
            seed_hash("partner123"),
            Role::NgoPartner,
            "NGO Partner",
        );
        partner.email = Some("partner@ngo.org".to_string());
        directory.insert(partner);

        let mut association = Principal::new(
            5,
            "association",
            seed_hash("assoc123"),
            Role::AssociationAdmin,
            "Association Administrator",
        );
        association.association_name = Some("Taipei Street Outreach Association".to_string());
        directory.insert(association);

        directory
    }

    /// Insert a principal, replacing any existing principal with the same id.
    pub fn insert(&self, principal: Principal) {
        let mut users = self.users.write().expect("directory lock poisoned");
        users.retain(|existing| existing.id != principal.id);
        users.push(principal);
    }

    /// Remove a principal. Returns whether one was removed.
    pub fn remove(&self, id: u64) -> bool {
        let mut users = self.users.write().expect("directory lock poisoned");
        let before = users.len();
        users.retain(|existing| existing.id != id);
        users.len() != before
    }
}

impl UserDirectory for InMemoryDirectory {
    fn find_by_username(&self, username: &str) -> Option<Principal> {
        let users = self.users.read().expect("directory lock poisoned");
        users.iter().find(|u| u.username == username).cloned()
    }

    fn find_by_id(&self, id: u64) -> Option<Principal> {
        let users = self.users.read().expect("directory lock poisoned");
        users.iter().find(|u| u.id == id).cloned()
    }
}

/// bcrypt-hash a seed password (cost 10).
fn seed_hash(password: &str) -> String {
    bcrypt::hash(password, 10).expect("bcrypt seed hashing failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_username_and_id() {
        let directory = InMemoryDirectory::new();
        directory.insert(Principal::new(9, "probe", "hash", Role::Store, "Probe"));

        assert_eq!(directory.find_by_username("probe").unwrap().id, 9);
        assert_eq!(directory.find_by_id(9).unwrap().username, "probe");
        assert!(directory.find_by_username("ghost").is_none());
        assert!(directory.find_by_id(404).is_none());
    }

    #[test]
    fn insert_replaces_same_id() {
        let directory = InMemoryDirectory::new();
        directory.insert(Principal::new(9, "probe", "hash", Role::Store, "Probe"));
        directory.insert(Principal::new(9, "probe", "hash", Role::NgoPartner, "Probe"));

        assert_eq!(directory.find_by_id(9).unwrap().role, Role::NgoPartner);
    }

    #[test]
    fn remove_reports_outcome() {
        let directory = InMemoryDirectory::new();
        directory.insert(Principal::new(9, "probe", "hash", Role::Store, "Probe"));

        assert!(directory.remove(9));
        assert!(!directory.remove(9));
        assert!(directory.find_by_id(9).is_none());
    }

    #[test]
    fn seeded_passwords_verify() {
        let directory = InMemoryDirectory::seeded();
        let store = directory.find_by_username("store1").unwrap();
        assert!(bcrypt::verify("store123", &store.password_hash).unwrap());
        assert!(!bcrypt::verify("wrong", &store.password_hash).unwrap());
    }
}
