//! Handlers for the `/proveedores` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::types::DbId;
use catalog_db::models::supplier::SupplierDetail;
use serde::{Deserialize, Serialize};

use crate::catalog::suppliers::{self, Availability, SupplierRequest};
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Payload of `GET /proveedores`.
#[derive(Debug, Serialize)]
pub struct SupplierList {
    pub suppliers: Vec<SupplierDetail>,
}

/// Query string of the availability check: `?dia=lunes&hora=10:00:00`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub dia: Option<String>,
    pub hora: Option<String>,
}

/// POST /api/proveedores
pub async fn create_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidJson(input): ValidJson<SupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SupplierDetail>>)> {
    let detail = suppliers::create_supplier(&state.pool, input).await?;
    Ok(ApiResponse::ok("Supplier created", detail).created())
}

/// GET /api/proveedores
pub async fn list_suppliers(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let suppliers = suppliers::list_suppliers(&state.pool).await?;
    tracing::debug!(count = suppliers.len(), "Listed suppliers");
    Ok(ApiResponse::ok("Supplier list", SupplierList { suppliers }).into_json())
}

/// GET /api/proveedores/{id}
pub async fn get_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<SupplierDetail>>> {
    let detail = suppliers::get_supplier(&state.pool, id).await?;
    Ok(ApiResponse::ok("Supplier found", detail).into_json())
}

/// PUT /api/proveedores/{id}
pub async fn update_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<SupplierRequest>,
) -> AppResult<Json<ApiResponse<SupplierDetail>>> {
    let detail = suppliers::update_supplier(&state.pool, id, input).await?;
    Ok(ApiResponse::ok("Supplier updated", detail).into_json())
}

/// DELETE /api/proveedores/{id}
pub async fn delete_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    suppliers::delete_supplier(&state.pool, id).await?;
    Ok(ApiResponse::message("Supplier deleted").into_json())
}

/// GET /api/proveedores/{id}/disponibilidad
pub async fn check_availability(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let availability = suppliers::check_availability(
        &state.pool,
        id,
        query.dia.as_deref(),
        query.hora.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok("Availability checked", availability).into_json())
}
