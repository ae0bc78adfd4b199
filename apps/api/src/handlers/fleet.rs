// [apps/api/src/handlers/fleet.rs]
//! `/organizations`, `/divisions`, `/staff`: fleet CRUD. These talk
//! to their repositories directly rather than through the Lifecycle
//! Coordinator — the repositories' own "Fleet-management update"
//! doc comments already carve this path out as separate from the
//! Workload Ledger's load bookkeeping, so there's no coordinator
//! method to route through. The `ManageFleet` policy check still
//! runs on every write, just inline rather than coordinator-wrapped.

use std::collections::BTreeSet;

use aegis_domain_lifecycle::{authorise, Action, IncidentAuthContext};
use aegis_domain_models::{
    CoreError, Division, DivisionStatus, DivisionType, Organisation, OrgCategory, OrgStatus, OrgType, Principal, Staff,
    StaffRole, StaffStatus,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn require_fleet_manager(principal: &Principal) -> Result<(), ApiError> {
    match authorise(principal, Action::ManageFleet, &IncidentAuthContext::default()) {
        aegis_domain_lifecycle::PolicyDecision::Allow => Ok(()),
        aegis_domain_lifecycle::PolicyDecision::Deny(reason) => Err(ApiError(CoreError::Forbidden(reason))),
    }
}

// ---- organisations ----

#[derive(Debug, Deserialize)]
pub struct OrganisationRequest {
    pub name: String,
    pub org_type: OrgType,
    pub category: OrgCategory,
    #[serde(default)]
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    #[serde(default = "default_org_status")]
    pub status: OrgStatus,
}

fn default_org_status() -> OrgStatus {
    OrgStatus::Available
}

pub async fn list_organisations(State(state): State<AppState>) -> ApiResult<Json<Vec<Organisation>>> {
    let connection = state.db.connection()?;
    Ok(Json(state.organisations.list_all(&connection).await?))
}

pub async fn get_organisation(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Organisation>> {
    let connection = state.db.connection()?;
    let org = state
        .organisations
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("organisation {id}")))?;
    Ok(Json(org))
}

pub async fn create_organisation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<OrganisationRequest>,
) -> ApiResult<(StatusCode, Json<Organisation>)> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let org = Organisation {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        org_type: req.org_type,
        category: req.category,
        region: req.region,
        latitude: req.latitude,
        longitude: req.longitude,
        capacity: req.capacity,
        current_load: 0,
        status: req.status,
    };
    state.organisations.insert(&connection, &org).await?;
    Ok((StatusCode::CREATED, Json(org)))
}

pub async fn update_organisation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<OrganisationRequest>,
) -> ApiResult<Json<Organisation>> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let existing = state
        .organisations
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("organisation {id}")))?;
    let org = Organisation {
        id,
        name: req.name,
        org_type: req.org_type,
        category: req.category,
        region: req.region,
        latitude: req.latitude,
        longitude: req.longitude,
        capacity: req.capacity,
        current_load: existing.current_load,
        status: req.status,
    };
    state.organisations.update(&connection, &org).await?;
    Ok(Json(org))
}

pub async fn delete_organisation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    state.organisations.delete(&connection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- divisions ----

#[derive(Debug, Deserialize)]
pub struct DivisionRequest {
    pub organisation_id: String,
    pub division_type: DivisionType,
    #[serde(default)]
    pub description: Option<String>,
    pub capacity: u32,
    #[serde(default = "default_division_status")]
    pub status: DivisionStatus,
    #[serde(default)]
    pub skills: BTreeSet<String>,
}

fn default_division_status() -> DivisionStatus {
    DivisionStatus::Active
}

pub async fn list_divisions(State(state): State<AppState>) -> ApiResult<Json<Vec<Division>>> {
    let connection = state.db.connection()?;
    Ok(Json(state.divisions.list_all(&connection).await?))
}

pub async fn get_division(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Division>> {
    let connection = state.db.connection()?;
    let division = state
        .divisions
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("division {id}")))?;
    Ok(Json(division))
}

pub async fn create_division(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<DivisionRequest>,
) -> ApiResult<(StatusCode, Json<Division>)> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let division = Division {
        id: Uuid::new_v4().to_string(),
        organisation_id: req.organisation_id,
        division_type: req.division_type,
        description: req.description,
        capacity: req.capacity,
        current_load: 0,
        status: req.status,
        skills: req.skills,
    };
    state.divisions.insert(&connection, &division).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

pub async fn update_division(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<DivisionRequest>,
) -> ApiResult<Json<Division>> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let existing = state
        .divisions
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("division {id}")))?;
    let division = Division {
        id,
        organisation_id: req.organisation_id,
        division_type: req.division_type,
        description: req.description,
        capacity: req.capacity,
        current_load: existing.current_load,
        status: req.status,
        skills: req.skills,
    };
    state.divisions.update(&connection, &division).await?;
    Ok(Json(division))
}

pub async fn delete_division(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    state.divisions.delete(&connection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- staff ----

#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    pub organisation_id: String,
    #[serde(default)]
    pub division_id: Option<String>,
    pub role: StaffRole,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_staff_status")]
    pub status: StaffStatus,
}

fn default_staff_status() -> StaffStatus {
    StaffStatus::Active
}

pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Json<Vec<Staff>>> {
    let connection = state.db.connection()?;
    Ok(Json(state.staff.list_all(&connection).await?))
}

pub async fn get_staff(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Staff>> {
    let connection = state.db.connection()?;
    let staff = state.staff.find_by_id(&connection, &id).await?.ok_or_else(|| CoreError::NotFound(format!("staff {id}")))?;
    Ok(Json(staff))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<StaffRequest>,
) -> ApiResult<(StatusCode, Json<Staff>)> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let staff = Staff {
        id: Uuid::new_v4().to_string(),
        organisation_id: req.organisation_id,
        division_id: req.division_id,
        role: req.role,
        skills: req.skills,
        contact: req.contact,
        availability: aegis_domain_models::Availability::Available,
        latitude: req.latitude,
        longitude: req.longitude,
        status: req.status,
    };
    state.staff.insert(&connection, &staff).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn update_staff(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<StaffRequest>,
) -> ApiResult<Json<Staff>> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    let existing = state.staff.find_by_id(&connection, &id).await?.ok_or_else(|| CoreError::NotFound(format!("staff {id}")))?;
    let staff = Staff {
        id,
        organisation_id: req.organisation_id,
        division_id: req.division_id,
        role: req.role,
        skills: req.skills,
        contact: req.contact,
        availability: existing.availability,
        latitude: req.latitude,
        longitude: req.longitude,
        status: req.status,
    };
    state.staff.update(&connection, &staff).await?;
    Ok(Json(staff))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_fleet_manager(&principal)?;
    let connection = state.db.connection()?;
    state.staff.delete(&connection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
