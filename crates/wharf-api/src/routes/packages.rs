//! # Package Operations API
//!
//! Intake, status transitions, delivery-code issuance, and redemption.
//! Handlers translate between wire DTOs and domain types; the services
//! own the behavior. Delivery-code *values* never appear in package
//! snapshots — only the code state does. The value surfaces exactly once,
//! from the issuance endpoint, for hand-off to the notification relay.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wharf_core::{CustomerId, HandlingTag, PackageId, StaffId, SuiteNumber, Timestamp};
use wharf_lifecycle::{
    DeliveryCodeState, Package, PackageStatus, StatusHistoryEntry,
};
use wharf_service::TransitionOutcome;

use crate::error::AppError;
use crate::state::AppState;

/// Package router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/packages", post(create_package))
        .route("/v1/packages/{id}", get(get_package))
        .route("/v1/packages/{id}/transitions", post(propose_transition))
        .route("/v1/packages/{id}/delivery-code", post(issue_delivery_code))
        .route("/v1/packages/{id}/redemptions", post(redeem_delivery_code))
}

// ─── Wire Types ──────────────────────────────────────────────────────

/// Request to register a package at intake.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePackageRequest {
    /// Owning customer account.
    pub customer_id: Uuid,
    /// The customer's suite number.
    pub suite: String,
    /// Customer service level: `standard`, `premium`, or `enterprise`.
    pub customer_tier: String,
    /// Handling urgency: `low`, `medium` (default), or `high`.
    pub priority: Option<String>,
    /// Special-handling tags (free-form; normalized server-side).
    #[serde(default)]
    pub handling_tags: Vec<String>,
}

/// Package snapshot. Carries the delivery-code *state*, never the value.
#[derive(Debug, Serialize, ToSchema)]
pub struct PackageResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub suite: String,
    pub status: String,
    pub shipment_id: Option<Uuid>,
    pub priority: String,
    pub customer_tier: String,
    pub handling_tags: Vec<String>,
    pub delivery_code_state: String,
    pub created_at: String,
}

impl From<&Package> for PackageResponse {
    fn from(package: &Package) -> Self {
        let mut handling_tags: Vec<String> = package
            .handling_tags
            .iter()
            .map(|tag| tag.as_str().to_string())
            .collect();
        handling_tags.sort();
        Self {
            id: package.id.0,
            customer_id: package.customer_id.0,
            suite: package.suite.as_str().to_string(),
            status: package.status.name().to_string(),
            shipment_id: package.shipment_id.map(|s| s.0),
            priority: package.priority.to_string(),
            customer_tier: package.customer_tier.to_string(),
            handling_tags,
            delivery_code_state: code_state_name(&package.delivery_code).to_string(),
            created_at: package.created_at.to_iso8601(),
        }
    }
}

/// One status-timeline entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub status: String,
    pub timestamp: String,
    pub actor: String,
    pub reason: Option<String>,
    pub location: Option<String>,
}

impl From<&StatusHistoryEntry> for HistoryEntryResponse {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            status: entry.status.name().to_string(),
            timestamp: entry.timestamp.to_iso8601(),
            actor: entry.actor.name().to_string(),
            reason: entry.reason.clone(),
            location: entry.location.clone(),
        }
    }
}

/// Package snapshot with its timeline.
#[derive(Debug, Serialize, ToSchema)]
pub struct PackageDetailResponse {
    pub package: PackageResponse,
    pub history: Vec<HistoryEntryResponse>,
}

/// Request to propose a status transition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status wire name (e.g. `IN_TRANSIT`).
    pub target_status: String,
    /// Acting role: `customer`, `warehouse_staff`, `warehouse_admin`,
    /// or `system`.
    pub actor_role: String,
    pub reason: Option<String>,
    pub location: Option<String>,
}

/// Transition proposal outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub accepted: bool,
    /// The proposal re-confirmed a terminal status; nothing changed.
    pub terminal_noop: bool,
    pub new_status: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    /// Whether this transition issued a delivery code as a follow-up.
    pub code_issued: bool,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        let mut errors: Vec<String> = outcome
            .validation
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect();
        errors.extend(outcome.findings.errors.iter().map(|f| f.message.clone()));

        let mut warnings: Vec<String> = outcome
            .validation
            .warnings
            .iter()
            .map(|w| w.to_string())
            .collect();
        warnings.extend(outcome.findings.warnings.iter().map(|f| f.message.clone()));

        let suggestions = outcome
            .findings
            .suggestions
            .iter()
            .map(|f| f.message.clone())
            .collect();

        Self {
            accepted: outcome.accepted,
            terminal_noop: outcome.terminal_noop,
            new_status: outcome.new_status.map(|s| s.name().to_string()),
            errors,
            warnings,
            suggestions,
            code_issued: outcome.code_issued,
        }
    }
}

/// Issued delivery code, for hand-off to the notification relay.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueCodeResponse {
    pub code: String,
    /// `false` when the code already existed (idempotent re-request).
    pub newly_issued: bool,
}

/// Request to redeem a delivery code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    /// The suite number stated by the person collecting the package.
    pub suite_number: String,
    /// The submitted 6-digit code.
    pub code: String,
    /// The staff member performing the hand-off.
    pub staff_id: Uuid,
}

/// Redemption outcome. Declines are outcomes, not HTTP errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResponse {
    pub verified: bool,
    /// Decline reason code for the staff surface, absent on success.
    pub reason: Option<String>,
    pub message: String,
}

// ─── Handlers ────────────────────────────────────────────────────────

async fn create_package(
    State(state): State<AppState>,
    Json(req): Json<CreatePackageRequest>,
) -> Result<(StatusCode, Json<PackageResponse>), AppError> {
    let suite = SuiteNumber::new(&req.suite).map_err(|e| AppError::Validation(e.to_string()))?;
    let customer_tier = parse_enum(&req.customer_tier, "customer_tier")?;

    let now = Timestamp::now();
    let mut package = Package::new_intake(
        PackageId::new(),
        CustomerId(req.customer_id),
        suite,
        customer_tier,
        now,
    );
    if let Some(priority) = &req.priority {
        package.priority = parse_enum(priority, "priority")?;
    }
    for tag in &req.handling_tags {
        package.handling_tags.insert(HandlingTag::new(tag));
    }

    let initial = StatusHistoryEntry::new(
        package.id,
        package.status,
        now,
        wharf_core::ActorRole::System,
    )
    .with_reason("package intake");
    state.store.insert_package(package.clone(), initial).await?;

    Ok((StatusCode::CREATED, Json(PackageResponse::from(&package))))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PackageDetailResponse>, AppError> {
    let id = PackageId(id);
    let package = state
        .store
        .get_package(id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;
    let history = state.store.history(id).await?;
    Ok(Json(PackageDetailResponse {
        package: PackageResponse::from(&package),
        history: history.iter().map(HistoryEntryResponse::from).collect(),
    }))
}

async fn propose_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    let target = PackageStatus::parse(&req.target_status)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let actor = parse_enum(&req.actor_role, "actor_role")?;

    let outcome = state
        .services
        .transitions
        .propose(PackageId(id), target, actor, req.reason, req.location)
        .await?;
    Ok(Json(TransitionResponse::from(outcome)))
}

async fn issue_delivery_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueCodeResponse>, AppError> {
    let outcome = state.services.delivery.issue(PackageId(id)).await?;
    Ok(Json(IssueCodeResponse {
        code: outcome.code,
        newly_issued: outcome.newly_issued,
    }))
}

async fn redeem_delivery_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, AppError> {
    let outcome = state
        .services
        .delivery
        .redeem(
            PackageId(id),
            &req.suite_number,
            &req.code,
            StaffId(req.staff_id),
        )
        .await?;

    let reason = outcome
        .decline
        .map(|r| enum_name(&r).unwrap_or_else(|| format!("{r:?}")));
    Ok(Json(RedeemResponse {
        verified: outcome.verified,
        reason,
        message: outcome.message().to_string(),
    }))
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn code_state_name(state: &DeliveryCodeState) -> &'static str {
    match state {
        DeliveryCodeState::NoCode => "NO_CODE",
        DeliveryCodeState::Issued { .. } => "ISSUED",
        DeliveryCodeState::Redeemed { .. } => "REDEEMED",
        DeliveryCodeState::Expired { .. } => "EXPIRED",
    }
}

/// Parse a string-shaped enum from its wire name.
fn parse_enum<T: DeserializeOwned>(s: &str, what: &str) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| AppError::Validation(format!("invalid {what}: {s:?}")))
}

/// Serialize a string-shaped enum to its wire name.
fn enum_name<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}
