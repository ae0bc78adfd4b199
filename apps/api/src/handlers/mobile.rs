// [apps/api/src/handlers/mobile.rs]
//! `/mobile/*`: the field-app intake surface. Binary multipart parts
//! (imagery, video, audio) are treated as opaque refs rather than
//! persisted — satellite imagery analysis and the storage backend
//! are external collaborators this core never reaches into.

use aegis_domain_ingestion::{modality, normalise, FraudFeatures, RawIntakeMetadata};
use aegis_domain_models::{CoreError, DispatchJobState};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Timelike;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

fn opaque_ref(kind: &str) -> String {
    format!("upload://{kind}/{}", Uuid::new_v4())
}

#[derive(Debug, Serialize)]
pub struct SubmitTicketResponse {
    pub job_id: String,
    pub newly_created: bool,
}

pub async fn submit_ticket(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<(StatusCode, Json<SubmitTicketResponse>)> {
    let mut raw_metadata: Option<RawIntakeMetadata> = None;
    let mut image_refs = Vec::new();
    let mut video_refs = Vec::new();
    let mut audio_ref: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| CoreError::InvalidInput(format!("malformed multipart body: {e}")))? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "metadata" => {
                let text = field.text().await.map_err(|e| CoreError::InvalidInput(format!("metadata field: {e}")))?;
                raw_metadata = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| CoreError::InvalidInput(format!("metadata did not match the intake schema: {e}")))?,
                );
            }
            "images" => image_refs.push(opaque_ref("images")),
            "videos" => video_refs.push(opaque_ref("videos")),
            "audio_file" => audio_ref = Some(opaque_ref("audio")),
            other => warn!("📎 [MOBILE_INTAKE]: ignoring unrecognised multipart field '{other}'"),
        }
    }

    let mut raw = raw_metadata.ok_or_else(|| CoreError::InvalidInput("multipart body is missing the 'metadata' field".into()))?;
    if !image_refs.is_empty() {
        raw.image = image_refs;
    }
    if !video_refs.is_empty() {
        raw.video = video_refs;
    }
    if audio_ref.is_some() {
        raw.audio_file_ref = audio_ref;
    }

    let document = normalise::normalise(raw);
    let annotations = modality::analyse_modality(&document, None).await;

    let voice_transcript_text = document.voice_transcript.as_ref().map(|t| t.raw_text.as_str());
    let triage = aegis_domain_triage::triage(state.classifier.as_deref(), &annotations.resolved_text, 1, None, voice_transcript_text, None).await;

    let hour = document.captured_at.hour();
    let fraud_features = FraudFeatures {
        text_length: annotations.resolved_text.len(),
        repeat_submissions_from_device: 0,
        image_perceptual_hash_collision: false,
        device_age_seconds: 0,
        off_hours_flag: !(6..22).contains(&hour),
    };

    let connection = state.db.connection()?;
    let outcome = state
        .ingestion
        .verify_and_enqueue(&connection, &document, annotations, &triage.category, triage.priority, &fraud_features, &document.ticket_id_client)
        .await?;

    let status = if outcome.newly_created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(SubmitTicketResponse { job_id: outcome.job_id, newly_created: outcome.newly_created })))
}

/// Stub: no conversational agent is wired into this core — only the
/// surface that would carry one.
pub async fn chat_message(State(_state): State<AppState>, Path(session): Path<String>, body: String) -> Json<serde_json::Value> {
    Json(json!({ "session": session, "received": !body.is_empty(), "reply": null }))
}

pub async fn voice_agent(State(_state): State<AppState>, body: String) -> Json<serde_json::Value> {
    Json(json!({ "received": !body.is_empty(), "reply": null }))
}

#[derive(Debug, Serialize)]
pub struct TicketStatusResponse {
    pub job_id: String,
    pub state: DispatchJobState,
    pub last_error: Option<String>,
    pub attempt_count: u32,
}

pub async fn ticket_status(State(state): State<AppState>, Path(client_id): Path<String>) -> ApiResult<Json<TicketStatusResponse>> {
    let connection = state.db.connection()?;
    let job = state
        .dispatch_jobs
        .find_by_incident_client_id(&connection, &client_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("no dispatch job for client ticket {client_id}")))?;
    Ok(Json(TicketStatusResponse { job_id: job.id, state: job.state, last_error: job.last_error, attempt_count: job.attempt_count }))
}

#[derive(Debug, Serialize)]
pub struct RetryPendingResponse {
    pub retried: usize,
}

pub async fn retry_pending(State(state): State<AppState>) -> ApiResult<Json<RetryPendingResponse>> {
    let connection = state.db.connection()?;
    const LIMIT: i64 = 500;
    let failed = state.dispatch_jobs.list_by_state(&connection, DispatchJobState::FailedTerminal, LIMIT).await?;
    let mut retried = 0;
    for job in failed {
        state.dispatch_jobs.retry_now(&connection, &job.id).await?;
        retried += 1;
    }
    Ok(Json(RetryPendingResponse { retried }))
}
