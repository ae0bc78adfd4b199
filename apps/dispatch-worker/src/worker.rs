// [apps/dispatch-worker/src/worker.rs]
//! The worker pool itself: each task polls the queue in
//! strict priority-lane order, periodically yielding to the oldest
//! queued job regardless of lane so a `p3` job never starves forever.

use std::sync::Arc;
use std::time::Duration;

use aegis_domain_models::{AuditEvent, DispatchJob};
use aegis_infra_dispatch_client::{DeliveryOutcome, DispatchSinkClient};
use aegis_infra_store::repositories::{AuditRepository, DispatchJobRepository};
use aegis_infra_store::DbClient;
use chrono::{Duration as ChronoDuration, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::backoff::next_delay_seconds;
use crate::config::WorkerConfig;

const SYSTEM_PRINCIPAL: &str = "SYSTEM_DISPATCH_WORKER";

pub struct DispatchWorkerPool {
    db: DbClient,
    sink: Arc<DispatchSinkClient>,
    dispatch_jobs: DispatchJobRepository,
    audit: AuditRepository,
    config: Arc<WorkerConfig>,
}

impl DispatchWorkerPool {
    pub fn new(db: DbClient, sink: DispatchSinkClient, config: WorkerConfig) -> Self {
        Self {
            db,
            sink: Arc::new(sink),
            dispatch_jobs: DispatchJobRepository::new(),
            audit: AuditRepository::new(),
            config: Arc::new(config),
        }
    }

    /// Spawns `worker_count` independent polling tasks and blocks
    /// until all of them exit (they don't, barring a panic — this is
    /// meant to be the tail call of `main`).
    pub async fn run(self) {
        let worker_count = self.config.worker_count;
        info!("🚚 [DISPATCH_WORKER]: launching pool of {worker_count} workers");

        let mut handles = Vec::with_capacity(worker_count);
        for worker_index in 0..worker_count {
            let db = self.db.clone();
            let sink = Arc::clone(&self.sink);
            let dispatch_jobs = self.dispatch_jobs.clone();
            let audit = self.audit.clone();
            let config = Arc::clone(&self.config);

            handles.push(tokio::spawn(async move {
                worker_loop(worker_index, db, sink, dispatch_jobs, audit, config).await;
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[instrument(skip(db, sink, dispatch_jobs, audit, config))]
async fn worker_loop(
    worker_index: usize,
    db: DbClient,
    sink: Arc<DispatchSinkClient>,
    dispatch_jobs: DispatchJobRepository,
    audit: AuditRepository,
    config: Arc<WorkerConfig>,
) {
    let mut claims_since_fairness_tick: u32 = 0;

    loop {
        let connection = match db.connection() {
            Ok(connection) => connection,
            Err(err) => {
                error!(worker = worker_index, "💥 [DISPATCH_WORKER]: failed to open connection: {err}");
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                continue;
            }
        };

        let now = Utc::now();
        claims_since_fairness_tick += 1;
        let use_fairness_ticket = claims_since_fairness_tick % config.fairness_ticket == 0;

        let claimed = if use_fairness_ticket {
            dispatch_jobs.claim_oldest(&connection, now).await
        } else {
            dispatch_jobs.claim_next(&connection, now).await
        };

        let job = match claimed {
            Ok(Some(job)) => job,
            Ok(None) => {
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                continue;
            }
            Err(err) => {
                error!(worker = worker_index, "💥 [DISPATCH_WORKER]: claim failed: {err}");
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                continue;
            }
        };

        process_job(worker_index, &connection, &sink, &dispatch_jobs, &audit, &config, job).await;
    }
}

#[instrument(skip(connection, sink, dispatch_jobs, audit, config, job), fields(job_id = %job.id, lane = job.lane.as_str()))]
async fn process_job(
    worker_index: usize,
    connection: &libsql::Connection,
    sink: &DispatchSinkClient,
    dispatch_jobs: &DispatchJobRepository,
    audit: &AuditRepository,
    config: &WorkerConfig,
    job: DispatchJob,
) {
    let outcome = sink.deliver(&job.payload).await;

    let result = match outcome {
        DeliveryOutcome::Delivered => {
            info!(worker = worker_index, "✅ [DISPATCH_WORKER]: delivered");
            dispatch_jobs.mark_delivered(connection, &job.id).await
        }
        DeliveryOutcome::RejectedTerminal { status, body } => {
            warn!(worker = worker_index, status, "🛑 [DISPATCH_WORKER]: terminal rejection");
            let reason = format!("rejected status {status}: {body}");
            let outcome = dispatch_jobs.reschedule_or_fail(connection, &job.id, Utc::now(), true, &reason).await;
            if outcome.is_ok() {
                emit_terminal_alert(audit, connection, &job, &reason).await;
            }
            outcome
        }
        DeliveryOutcome::Retryable { reason } => {
            let next_attempt_count = job.attempt_count + 1;
            if next_attempt_count >= config.max_attempts {
                warn!(worker = worker_index, "🛑 [DISPATCH_WORKER]: exhausted {} attempts, parking terminally", config.max_attempts);
                let outcome = dispatch_jobs.reschedule_or_fail(connection, &job.id, Utc::now(), true, &reason).await;
                if outcome.is_ok() {
                    emit_terminal_alert(audit, connection, &job, &reason).await;
                }
                outcome
            } else {
                let delay = next_delay_seconds(config.initial_backoff_seconds, next_attempt_count, config.max_backoff_seconds);
                let next_attempt_at = Utc::now() + ChronoDuration::milliseconds((delay * 1000.0) as i64);
                info!(worker = worker_index, delay_seconds = delay, "🔁 [DISPATCH_WORKER]: rescheduling after failure: {reason}");
                dispatch_jobs.reschedule_or_fail(connection, &job.id, next_attempt_at, false, &reason).await
            }
        }
    };

    if let Err(err) = result {
        error!(worker = worker_index, "💥 [DISPATCH_WORKER]: failed to persist job outcome: {err}");
    }
}

async fn emit_terminal_alert(audit: &AuditRepository, connection: &libsql::Connection, job: &DispatchJob, reason: &str) {
    let event = AuditEvent {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        principal: SYSTEM_PRINCIPAL.to_string(),
        incident_id: job.incident_client_id.clone(),
        kind: "dispatch_terminal_failure".to_string(),
        before: Some(serde_json::json!({ "job_id": job.id, "lane": job.lane.as_str() })),
        after: Some(serde_json::json!({ "reason": reason })),
    };
    if let Err(err) = audit.append(connection, &event).await {
        error!("💥 [DISPATCH_WORKER]: failed to record terminal-failure alert: {err}");
    }
}
