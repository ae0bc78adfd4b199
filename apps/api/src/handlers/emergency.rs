// [apps/api/src/handlers/emergency.rs]
//! `/emergency/*`: assignment-window lifecycle transitions plus the
//! read-only smart-assignment preview and cross-status summary.

use aegis_core_geo::LatLng;
use aegis_domain_assignment::{rank, Candidate, FleetSnapshot};
use aegis_domain_models::{CoreError, Incident, IncidentStatus, Principal};
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SmartAssignmentQuery {
    pub sos_id: String,
}

/// Read-only preview: builds a fresh `FleetSnapshot` and ranks
/// candidates without touching any cooldown or committing anything —
/// unlike `assign_emergency`, this never calls the coordinator.
pub async fn smart_assignment(State(state): State<AppState>, Query(q): Query<SmartAssignmentQuery>) -> ApiResult<Json<Vec<Candidate>>> {
    let connection = state.db.connection()?;
    let incident = state
        .incidents
        .find_by_id(&connection, &q.sos_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("incident {}", q.sos_id)))?;
    let triage = incident
        .triage
        .ok_or_else(|| CoreError::Internal(format!("incident {} has no triage result", q.sos_id)))?;

    let organisations = state.organisations.list_active(&connection).await?;
    let divisions = state.divisions.list_all(&connection).await?;
    let staff = state.staff.list_all(&connection).await?;
    let snapshot = FleetSnapshot::new(organisations, divisions, staff);

    let candidates = rank(&triage, LatLng::new(incident.latitude, incident.longitude), &snapshot);
    Ok(Json(candidates))
}

#[derive(Debug, Deserialize)]
pub struct IncidentIdBody {
    pub incident_id: String,
}

pub async fn assign_emergency(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<IncidentIdBody>,
) -> ApiResult<Json<Incident>> {
    let incident = state.coordinator.start_window(&principal, &body.incident_id).await?;
    Ok(Json(incident))
}

pub async fn accept_assignment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<IncidentIdBody>,
) -> ApiResult<Json<Incident>> {
    let incident = state.coordinator.accept(&principal, &body.incident_id).await?;
    Ok(Json(incident))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub incident_id: String,
    #[serde(default = "default_reject_reason")]
    pub reason: String,
}

fn default_reject_reason() -> String {
    "declined".to_string()
}

pub async fn reject_assignment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<RejectBody>,
) -> ApiResult<Json<Incident>> {
    let incident = state.coordinator.reject(&principal, &body.incident_id, &body.reason).await?;
    Ok(Json(incident))
}

pub async fn complete_emergency(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<IncidentIdBody>,
) -> ApiResult<Json<Incident>> {
    let incident = state.coordinator.complete(&principal, &body.incident_id).await?;
    Ok(Json(incident))
}

#[derive(Debug, Serialize)]
pub struct EmergencySummary {
    pub pending: Vec<Incident>,
    pub pending_assignment: Vec<Incident>,
    pub in_progress: Vec<Incident>,
}

/// No single "active" status exists in the FSM (`Pending` and
/// `PendingAssignment` stay distinct), so the summary merges three
/// separate queries rather than one.
pub async fn emergency_summary(State(state): State<AppState>) -> ApiResult<Json<EmergencySummary>> {
    let connection = state.db.connection()?;
    const LIMIT: i64 = 200;
    let pending = state.incidents.list_by_status(&connection, IncidentStatus::Pending, LIMIT).await?;
    let pending_assignment = state.incidents.list_by_status(&connection, IncidentStatus::PendingAssignment, LIMIT).await?;
    let in_progress = state.incidents.list_by_status(&connection, IncidentStatus::InProgress, LIMIT).await?;
    Ok(Json(EmergencySummary { pending, pending_assignment, in_progress }))
}
