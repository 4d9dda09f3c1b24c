// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction endpoints: the guarded debit and the transaction log.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::extractor::{require_role, DEBIT_ROLES};
use crate::auth::{Auth, OptionalAuth};
use crate::error::ApiError;
use crate::models::TransactionRecord;
use crate::state::AppState;
use crate::storage::LedgerError;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to debit a beneficiary's balance.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// QR code of the beneficiary to debit.
    #[serde(default)]
    pub homeless_qr_code: Option<String>,
    /// QR code of the store performing the debit, if scanned.
    #[serde(default)]
    pub store_qr_code: Option<String>,
    /// Points to deduct. Must be positive.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Item the points were redeemed for.
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Completed debit plus the balance it left behind.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebitOutcome {
    pub transaction: TransactionRecord,
    pub new_balance: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebitResponse {
    pub success: bool,
    pub message: String,
    pub data: DebitOutcome,
}

/// Query parameters for the transaction log.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    /// Restrict to records touching this QR code (either side).
    pub qr_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionListResponse {
    pub success: bool,
    pub data: Vec<TransactionRecord>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Debit a beneficiary's balance and record the transaction.
///
/// Requires a store or NGO staff session. The check-then-debit sequence is
/// atomic per beneficiary; a rejected debit leaves balance and log untouched.
#[utoipa::path(
    post,
    path = "/transaction",
    tag = "Transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 200, description = "Debit applied", body = DebitResponse),
        (status = 400, description = "Missing fields, non-positive amount, or insufficient balance"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
        (status = 404, description = "Beneficiary not found"),
    )
)]
pub async fn create_transaction(
    Auth(operator): Auth,
    State(state): State<AppState>,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<Json<DebitResponse>, ApiError> {
    require_role(&operator, DEBIT_ROLES)?;

    let qr_code = body.homeless_qr_code.as_deref().unwrap_or("");
    if qr_code.is_empty() {
        return Err(ApiError::bad_request("Transaction details are incomplete"));
    }

    let (transaction, new_balance) = state
        .ledger
        .debit(
            qr_code,
            body.amount.unwrap_or(0),
            body.store_qr_code,
            body.product_name,
        )
        .await
        .map_err(|err| match err {
            LedgerError::BeneficiaryNotFound => ApiError::not_found(err.to_string()),
            other => ApiError::bad_request(other.to_string()),
        })?;

    Ok(Json(DebitResponse {
        success: true,
        message: "Transaction completed".to_string(),
        data: DebitOutcome {
            transaction,
            new_balance,
        },
    }))
}

/// Read the transaction log.
///
/// Authenticated principals may read the whole log, optionally filtered.
/// Guests get a kiosk-style view: they must name a QR code and see only the
/// records touching it.
#[utoipa::path(
    get,
    path = "/transaction",
    tag = "Transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Matching transaction records", body = TransactionListResponse),
        (status = 401, description = "Guest requested the unfiltered log"),
    )
)]
pub async fn list_transactions(
    OptionalAuth(principal): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let filter = query.qr_code.as_deref();

    if principal.is_none() && filter.is_none() {
        return Err(ApiError::unauthorized(
            "Authentication required to list all transactions",
        ));
    }

    Ok(Json(TransactionListResponse {
        success: true,
        data: state.ledger.transactions(filter),
    }))
}
