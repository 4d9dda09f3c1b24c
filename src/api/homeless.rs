// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Beneficiary endpoints: public QR lookup, guarded registry list, and the
//! NGO balance top-up.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Auth, NgoStaff};
use crate::error::ApiError;
use crate::models::Beneficiary;
use crate::state::AppState;
use crate::storage::LedgerError;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct BeneficiaryResponse {
    pub success: bool,
    pub data: Beneficiary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BeneficiaryListResponse {
    pub success: bool,
    pub data: Vec<Beneficiary>,
}

/// Request to set a beneficiary's balance.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceRequest {
    pub new_balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdated {
    pub qr_code: String,
    pub new_balance: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceUpdateResponse {
    pub success: bool,
    pub message: String,
    pub data: BalanceUpdated,
}

// =============================================================================
// Handlers
// =============================================================================

/// Look up a beneficiary by QR code.
///
/// Public: this is what a store terminal shows right after scanning a card.
#[utoipa::path(
    get,
    path = "/homeless/{qr_code}",
    tag = "Homeless",
    params(("qr_code" = String, Path, description = "Beneficiary QR code")),
    responses(
        (status = 200, description = "Beneficiary record", body = BeneficiaryResponse),
        (status = 404, description = "No beneficiary behind this code"),
    )
)]
pub async fn get_by_qr_code(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
) -> Result<Json<BeneficiaryResponse>, ApiError> {
    let beneficiary = state
        .ledger
        .beneficiary_by_qr(&qr_code)
        .ok_or_else(|| ApiError::not_found("Beneficiary not found"))?;

    Ok(Json(BeneficiaryResponse {
        success: true,
        data: beneficiary,
    }))
}

/// List every beneficiary. NGO staff only.
#[utoipa::path(
    get,
    path = "/homeless",
    tag = "Homeless",
    responses(
        (status = 200, description = "All beneficiary records", body = BeneficiaryListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
    )
)]
pub async fn list_beneficiaries(
    NgoStaff(_staff): NgoStaff,
    State(state): State<AppState>,
) -> Json<BeneficiaryListResponse> {
    Json(BeneficiaryListResponse {
        success: true,
        data: state.ledger.beneficiaries(),
    })
}

/// Set a beneficiary's balance (top-up). Requires authentication.
///
/// Serialized against in-flight debits on the same beneficiary.
#[utoipa::path(
    patch,
    path = "/homeless/{qr_code}/balance",
    tag = "Homeless",
    params(("qr_code" = String, Path, description = "Beneficiary QR code")),
    request_body = UpdateBalanceRequest,
    responses(
        (status = 200, description = "Balance updated", body = BalanceUpdateResponse),
        (status = 400, description = "Negative balance"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No beneficiary behind this code"),
    )
)]
pub async fn update_balance(
    Auth(operator): Auth,
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
    Json(body): Json<UpdateBalanceRequest>,
) -> Result<Json<BalanceUpdateResponse>, ApiError> {
    let new_balance = state
        .ledger
        .set_balance(&qr_code, body.new_balance)
        .await
        .map_err(|err| match err {
            LedgerError::BeneficiaryNotFound => ApiError::not_found(err.to_string()),
            other => ApiError::bad_request(other.to_string()),
        })?;

    tracing::info!(
        operator = %operator.username,
        beneficiary = %qr_code,
        new_balance,
        "balance updated"
    );

    Ok(Json(BalanceUpdateResponse {
        success: true,
        message: "Balance updated".to_string(),
        data: BalanceUpdated {
            qr_code,
            new_balance,
        },
    }))
}
