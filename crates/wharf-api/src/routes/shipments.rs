//! # Shipment Operations API
//!
//! Grouping packages into shipments, shipment snapshots, and the
//! reconciliation endpoints (single shipment and maintenance sweep).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wharf_core::{PackageId, ShipmentId, Timestamp};
use wharf_lifecycle::{Shipment, ShipmentTransitionRecord};

use crate::error::AppError;
use crate::state::AppState;

/// Shipment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/shipments", post(create_shipment))
        .route("/v1/shipments/{id}", get(get_shipment))
        .route("/v1/shipments/{id}/reconcile", post(reconcile_shipment))
        .route("/v1/shipments/reconcile", post(reconcile_sweep))
}

// ─── Wire Types ──────────────────────────────────────────────────────

/// Request to group packages into a shipment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShipmentRequest {
    /// Member packages, in grouping order. Must be non-empty.
    pub package_ids: Vec<Uuid>,
}

/// One shipment audit-log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentTransitionResponse {
    pub from_status: String,
    pub to_status: String,
    pub timestamp: String,
    pub reason: String,
}

impl From<&ShipmentTransitionRecord> for ShipmentTransitionResponse {
    fn from(record: &ShipmentTransitionRecord) -> Self {
        Self {
            from_status: record.from_status.name().to_string(),
            to_status: record.to_status.name().to_string(),
            timestamp: record.timestamp.to_iso8601(),
            reason: record.reason.clone(),
        }
    }
}

/// Shipment snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub status: String,
    pub package_ids: Vec<Uuid>,
    pub package_count: u32,
    pub transitions: Vec<ShipmentTransitionResponse>,
    pub created_at: String,
}

impl From<&Shipment> for ShipmentResponse {
    fn from(shipment: &Shipment) -> Self {
        Self {
            id: shipment.id.0,
            status: shipment.status.name().to_string(),
            package_ids: shipment.package_ids.iter().map(|p| p.0).collect(),
            package_count: shipment.package_count,
            transitions: shipment
                .transitions
                .iter()
                .map(ShipmentTransitionResponse::from)
                .collect(),
            created_at: shipment.created_at.to_iso8601(),
        }
    }
}

/// Single-shipment reconciliation outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileResponse {
    pub promoted: bool,
}

/// Maintenance sweep outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    pub inspected: usize,
    pub promoted: usize,
}

// ─── Handlers ────────────────────────────────────────────────────────

async fn create_shipment(
    State(state): State<AppState>,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ShipmentResponse>), AppError> {
    if req.package_ids.is_empty() {
        return Err(AppError::Validation(
            "a shipment needs at least one package".to_string(),
        ));
    }

    let shipment = Shipment::new(
        ShipmentId::new(),
        req.package_ids.into_iter().map(PackageId).collect(),
        Timestamp::now(),
    );
    state.store.create_shipment(shipment.clone()).await?;
    Ok((StatusCode::CREATED, Json(ShipmentResponse::from(&shipment))))
}

async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentResponse>, AppError> {
    let id = ShipmentId(id);
    let shipment = state
        .store
        .get_shipment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

async fn reconcile_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let outcome = state
        .services
        .reconciler
        .reconcile(ShipmentId(id))
        .await?;
    Ok(Json(ReconcileResponse {
        promoted: outcome.promoted,
    }))
}

async fn reconcile_sweep(
    State(state): State<AppState>,
) -> Result<Json<SweepResponse>, AppError> {
    let summary = state.services.reconciler.sweep().await?;
    Ok(Json(SweepResponse {
        inspected: summary.inspected,
        promoted: summary.promoted,
    }))
}
