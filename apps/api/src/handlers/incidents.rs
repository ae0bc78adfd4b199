// [apps/api/src/handlers/incidents.rs]
//! `/sos` and `/sos/intake`: incident CRUD plus the trusted-webhook
//! creation path the Dispatch Worker's sink client posts back to.

use aegis_core_geo::{haversine_km, LatLng};
use aegis_domain_lifecycle::CreateIncidentInput;
use aegis_domain_models::{Facility, FacilityType, Incident, Principal};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIncidentRequest {
    pub text: String,
    #[serde(default)]
    pub voice_transcript: Option<String>,
    #[serde(default)]
    pub place_label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub headcount_affected: u32,
    #[serde(default)]
    pub category_hint: Option<String>,
    #[serde(default = "default_reporter_source")]
    pub reporter_source: String,
}

fn default_reporter_source() -> String {
    "web".to_string()
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateIncidentRequest>,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let input = CreateIncidentInput {
        external_id: None,
        reporter_source: req.reporter_source,
        text: req.text,
        voice_transcript: req.voice_transcript,
        place_label: req.place_label,
        latitude: req.latitude,
        longitude: req.longitude,
        headcount_affected: req.headcount_affected,
        created_by: principal.id.clone(),
        category_hint: req.category_hint,
    };
    let incident = state.coordinator.create(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// Request body shape matches exactly what `enqueue.rs` serialises
/// into a dispatch job's payload — this is the other end of the
/// Dispatch Worker's delivery call.
#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub ticket_id_client: String,
    pub text: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn intake(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<IntakeRequest>,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let input = CreateIncidentInput {
        external_id: Some(req.ticket_id_client),
        reporter_source: "mobile_dispatch".to_string(),
        text: req.text,
        voice_transcript: None,
        place_label: None,
        latitude: req.latitude,
        longitude: req.longitude,
        headcount_affected: 1,
        created_by: principal.id.clone(),
        category_hint: None,
    };
    let incident = state.coordinator.create(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> ApiResult<Json<Vec<Incident>>> {
    let connection = state.db.connection()?;
    let incidents = state.incidents.list_all(&connection, q.limit, q.offset).await?;
    Ok(Json(incidents))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Incident>> {
    let connection = state.db.connection()?;
    let incident = state
        .incidents
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| aegis_domain_models::CoreError::NotFound(format!("incident {id}")))?;
    Ok(Json(incident))
}

#[derive(Debug, Serialize)]
pub struct MapPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: aegis_domain_models::IncidentStatus,
    pub category: String,
    pub priority: u8,
}

pub async fn map(State(state): State<AppState>, Query(q): Query<ListQuery>) -> ApiResult<Json<Vec<MapPoint>>> {
    let connection = state.db.connection()?;
    let incidents = state.incidents.list_all(&connection, q.limit, q.offset).await?;
    let points = incidents
        .into_iter()
        .map(|i| MapPoint { id: i.id, latitude: i.latitude, longitude: i.longitude, status: i.status, category: i.category, priority: i.priority })
        .collect();
    Ok(Json(points))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

pub async fn update_notes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotesRequest>,
) -> ApiResult<Json<Incident>> {
    let incident = state.coordinator.update_notes(&principal, &id, req.notes.as_deref()).await?;
    Ok(Json(incident))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.coordinator.delete(&principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct NearestFacilities {
    pub nearest_shelter: Option<FacilityDistance>,
    pub nearest_hospital: Option<FacilityDistance>,
}

#[derive(Debug, Serialize)]
pub struct FacilityDistance {
    pub facility: Facility,
    pub distance_km: f64,
}

pub async fn nearest_facilities(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<NearestFacilities>> {
    let connection = state.db.connection()?;
    let incident = state
        .incidents
        .find_by_id(&connection, &id)
        .await?
        .ok_or_else(|| aegis_domain_models::CoreError::NotFound(format!("incident {id}")))?;
    let incident_location = LatLng::new(incident.latitude, incident.longitude);

    let facilities = state.facilities.list_all(&connection).await?;
    let nearest = |facility_type: FacilityType| -> Option<FacilityDistance> {
        facilities
            .iter()
            .filter(|f| f.facility_type == facility_type)
            .map(|f| {
                let distance_km = haversine_km(incident_location, LatLng::new(f.latitude, f.longitude));
                FacilityDistance { facility: f.clone(), distance_km }
            })
            .min_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap())
    };

    Ok(Json(NearestFacilities {
        nearest_shelter: nearest(FacilityType::Shelter),
        nearest_hospital: nearest(FacilityType::Hospital),
    }))
}
