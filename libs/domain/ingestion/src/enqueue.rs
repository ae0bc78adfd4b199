// [libs/domain/ingestion/src/enqueue.rs]
//! Stage 5: idempotent insert of the `DispatchJob`. A retry
//! carrying the same idempotency key is a no-op that hands back the
//! id of the row already sitting in the queue.

use aegis_domain_models::{CoreError, DispatchJob, DispatchJobState, PriorityLane};
use aegis_infra_store::DispatchJobRepository;
use chrono::Utc;
use libsql::Connection;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::document::{IntakeAnnotations, IntakeDocument};

#[derive(Debug, Clone)]
pub struct EnqueueOutcome {
    pub job_id: String,
    pub newly_created: bool,
}

#[instrument(skip(dispatch_jobs, connection, document, annotations))]
pub async fn enqueue(
    dispatch_jobs: &DispatchJobRepository,
    connection: &Connection,
    document: &IntakeDocument,
    annotations: &IntakeAnnotations,
    lane: PriorityLane,
    incident_client_id: &str,
) -> Result<EnqueueOutcome, CoreError> {
    let now = Utc::now();
    let payload = serde_json::json!({
        "ticket_id_client": document.ticket_id_client,
        "text": annotations.resolved_text,
        "text_source": annotations.text_source,
        "latitude": document.latitude,
        "longitude": document.longitude,
        "weather_unverified": annotations.weather_unverified,
        "likely_duplicate": annotations.likely_duplicate,
        "duplicate_cluster_id": annotations.duplicate_cluster_id,
        "fraud_score": annotations.fraud_score,
        "requires_review": annotations.requires_review,
    });

    let job = DispatchJob {
        id: Uuid::new_v4().to_string(),
        incident_client_id: incident_client_id.to_string(),
        idempotency_key: document.idempotency_key.clone(),
        payload,
        lane,
        attempt_count: 0,
        next_attempt_at: now,
        state: DispatchJobState::Queued,
        last_error: None,
        created_at: now,
        updated_at: now,
    };

    let inserted = dispatch_jobs.enqueue(connection, &job).await.map_err(CoreError::from)?;
    if inserted {
        info!(job_id = %job.id, lane = job.lane.as_str(), "📥 [INGEST]: enqueued dispatch job");
        return Ok(EnqueueOutcome { job_id: job.id, newly_created: true });
    }

    let existing = dispatch_jobs
        .find_by_idempotency_key(connection, &document.idempotency_key)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::Internal("dispatch job insert collided but no row found".into()))?;

    info!(job_id = %existing.id, "📥 [INGEST]: idempotency key already queued, returning existing job");
    Ok(EnqueueOutcome { job_id: existing.id, newly_created: false })
}
