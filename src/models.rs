// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Data Models
//!
//! This module defines the entities shared across the service: principals and
//! their roles, beneficiary ledger entries, partner store records, and the
//! append-only transaction log. All wire-facing types derive `Serialize` and
//! `ToSchema` for automatic JSON handling and OpenAPI documentation, and use
//! camelCase field names matching the browser clients.
//!
//! ## Model Categories
//!
//! - **Roles**: closed enumeration of every principal kind
//! - **Principals**: authenticated accounts (NGO staff, stores, beneficiaries)
//! - **Ledger**: beneficiary balances, store records, transaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Roles
// =============================================================================

/// Principal roles for authorization.
///
/// The set is closed: every principal carries exactly one of these, assigned
/// at creation and immutable afterwards. Wire format is the snake_case string
/// (`ngo_admin`, `store`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// NGO administrator (full registry access)
    NgoAdmin,
    /// NGO field partner
    NgoPartner,
    /// Merchant association administrator
    AssociationAdmin,
    /// Merchant association partner
    AssociationPartner,
    /// Partner store operating a scan terminal
    Store,
    /// Beneficiary holding a point balance
    Homeless,
    /// System administrator
    SystemAdmin,
}

impl Role {
    /// Parse a role from its wire string.
    ///
    /// Returns `None` for unknown strings; at the login boundary that outcome
    /// is folded into the generic invalid-credentials failure.
    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "ngo_admin" => Some(Role::NgoAdmin),
            "ngo_partner" => Some(Role::NgoPartner),
            "association_admin" => Some(Role::AssociationAdmin),
            "association_partner" => Some(Role::AssociationPartner),
            "store" => Some(Role::Store),
            "homeless" => Some(Role::Homeless),
            "system_admin" => Some(Role::SystemAdmin),
            _ => None,
        }
    }

    /// The wire string for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::NgoAdmin => "ngo_admin",
            Role::NgoPartner => "ngo_partner",
            Role::AssociationAdmin => "association_admin",
            Role::AssociationPartner => "association_partner",
            Role::Store => "store",
            Role::Homeless => "homeless",
            Role::SystemAdmin => "system_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Principals
// =============================================================================

/// An account able to authenticate.
///
/// Holds the bcrypt password hash and therefore never derives `Serialize`;
/// responses go through [`Principal::public_profile`].
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: u64,
    pub username: String,
    /// bcrypt hash of the password. Never compared as plaintext.
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub email: Option<String>,
    pub store_id: Option<String>,
    pub qr_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub balance: Option<u64>,
    pub association_name: Option<String>,
}

impl Principal {
    /// Create a principal with no role-specific profile fields set.
    pub fn new(
        id: u64,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            name: name.into(),
            email: None,
            store_id: None,
            qr_code: None,
            address: None,
            phone: None,
            id_number: None,
            balance: None,
            association_name: None,
        }
    }

    /// The principal without its password hash, as returned to clients.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            store_id: self.store_id.clone(),
            qr_code: self.qr_code.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            id_number: self.id_number.clone(),
            balance: self.balance,
            association_name: self.association_name.clone(),
        }
    }
}

/// Public view of a principal: everything except the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_name: Option<String>,
}

// =============================================================================
// Ledger Entities
// =============================================================================

/// A beneficiary ledger entry: the redeemable point balance behind a QR code.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    /// Stable ledger identifier (the national id number in seed data).
    pub id: String,
    pub name: String,
    pub id_number: String,
    /// Unique code printed on the beneficiary's card.
    pub qr_code: String,
    /// Redeemable points. Never negative.
    pub balance: u64,
    pub phone: String,
}

/// A partner store record, as shown after scanning a store QR code.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub id: String,
    pub name: String,
    pub qr_code: String,
    pub address: String,
    pub phone: String,
    /// Items redeemable at this store, with their point prices.
    pub products: Vec<Product>,
}

/// A redeemable item offered by a partner store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub points: u64,
    pub description: String,
}

/// Transaction outcome recorded in the ledger log.
///
/// The log is append-only and records completed debits only; a rejected debit
/// leaves no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

/// An immutable record of a completed debit.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    /// QR code of the debited beneficiary.
    pub homeless_qr_code: String,
    /// QR code of the store where the debit happened, if scanned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_qr_code: Option<String>,
    /// Points deducted. Always positive.
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Create a completed debit record stamped with the current time.
    pub fn completed(
        homeless_qr_code: impl Into<String>,
        store_qr_code: Option<String>,
        amount: u64,
        product_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            homeless_qr_code: homeless_qr_code.into(),
            store_qr_code,
            amount,
            product_name,
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
        }
    }

    /// Whether this record references the given QR code on either side.
    pub fn touches(&self, qr_code: &str) -> bool {
        self.homeless_qr_code == qr_code || self.store_qr_code.as_deref() == Some(qr_code)
    }
}
