// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Partner store endpoints: public QR lookup and the guarded registry list.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::NgoStaff;
use crate::error::ApiError;
use crate::models::StoreRecord;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreResponse {
    pub success: bool,
    pub data: StoreRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreListResponse {
    pub success: bool,
    pub data: Vec<StoreRecord>,
}

/// Look up a partner store by QR code.
///
/// Public: beneficiaries scan a store code to see its redeemable products.
#[utoipa::path(
    get,
    path = "/store/{qr_code}",
    tag = "Store",
    params(("qr_code" = String, Path, description = "Store QR code")),
    responses(
        (status = 200, description = "Store record with products", body = StoreResponse),
        (status = 404, description = "No store behind this code"),
    )
)]
pub async fn get_by_qr_code(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
) -> Result<Json<StoreResponse>, ApiError> {
    let store = state
        .ledger
        .store_by_qr(&qr_code)
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    Ok(Json(StoreResponse {
        success: true,
        data: store,
    }))
}

/// List every partner store. NGO staff only.
#[utoipa::path(
    get,
    path = "/store",
    tag = "Store",
    responses(
        (status = 200, description = "All store records", body = StoreListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
    )
)]
pub async fn list_stores(
    NgoStaff(_staff): NgoStaff,
    State(state): State<AppState>,
) -> Json<StoreListResponse> {
    Json(StoreListResponse {
        success: true,
        data: state.ledger.stores(),
    })
}
